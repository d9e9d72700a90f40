// SPDX-License-Identifier: MIT

//! `set_config`: obtains the user configuration through the `get-config`
//! hook, normalizes it and commits it to the build context.

use std::sync::{Arc, OnceLock};

use crate::config::UserConfig;
use crate::errors::PackError;
use crate::processor::{
    action_fn, hook_fn, HookArgs, HookFn, HookType, HookValue, TaskOptions,
};

/// Descriptor for the configuration stage. The same allocation is returned
/// on every call so composed pipelines share one task instance.
pub fn set_config() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        Arc::new(
            TaskOptions::new(
                "set-config",
                action_fn(|task, runner| async move {
                    let value = task
                        .call(
                            "get-config",
                            HookType::First,
                            HookArgs::bare(runner.context()),
                        )
                        .await?;
                    let Some(HookValue::Config(user)) = value else {
                        return Err(PackError::configuration(
                            "the 'get-config' hook yielded no configuration; hook one",
                        ));
                    };
                    let config = user.normalize()?;
                    tracing::debug!(cwd = %config.cwd.display(), dist = %config.dist, "configuration committed");
                    runner.context().set_config(config)
                }),
            )
            .with_hooks(&["get-config"]),
        )
    }))
}

/// Handler that yields a fixed configuration, for embedders that build one
/// programmatically.
pub fn provide_config(config: UserConfig) -> HookFn {
    hook_fn(move |_args| {
        let config = config.clone();
        async move { Ok(Some(HookValue::Config(config))) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildContext;
    use crate::processor::TaskRunner;
    use std::path::PathBuf;

    fn user_config() -> UserConfig {
        UserConfig {
            cwd: Some(PathBuf::from("/work")),
            ..UserConfig::default()
        }
    }

    #[tokio::test]
    async fn commits_the_hooked_configuration() {
        let runner = TaskRunner::new(BuildContext::new());
        let task = runner.task(&set_config()).unwrap();
        task.hook("get-config", provide_config(user_config())).unwrap();
        task.run(&runner, false).await.unwrap();
        assert_eq!(
            runner.context().config().unwrap().cwd,
            PathBuf::from("/work")
        );
    }

    #[tokio::test]
    async fn fails_without_a_get_config_hook() {
        let runner = TaskRunner::new(BuildContext::new());
        let task = runner.task(&set_config()).unwrap();
        assert!(matches!(
            task.run(&runner, false).await,
            Err(PackError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn the_first_configuration_wins() {
        let runner = TaskRunner::new(BuildContext::new());
        let task = runner.task(&set_config()).unwrap();
        task.hook("get-config", provide_config(user_config())).unwrap();
        task.hook(
            "get-config",
            provide_config(UserConfig {
                cwd: Some(PathBuf::from("/other")),
                ..UserConfig::default()
            }),
        )
        .unwrap();
        task.run(&runner, false).await.unwrap();
        assert_eq!(
            runner.context().config().unwrap().cwd,
            PathBuf::from("/work")
        );
    }
}
