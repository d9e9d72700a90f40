// SPDX-License-Identifier: MIT

//! `set_project`: obtains the package graph through the `resolve-project`
//! hook, commits it and loads the previous build manifest.

use std::sync::{Arc, OnceLock};

use crate::config::MetaSource;
use crate::errors::PackError;
use crate::processor::{
    action_fn, hook_fn, series, HookArgs, HookFn, HookType, HookValue, TaskOptions,
};
use crate::project::{Manifest, PkgGraph};
use crate::tasks::config::set_config;

pub fn set_project() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        Arc::new(
            TaskOptions::new(
                "set-project",
                action_fn(|task, runner| async move {
                    let value = task
                        .call(
                            "resolve-project",
                            HookType::First,
                            HookArgs::bare(runner.context()),
                        )
                        .await?;
                    let Some(HookValue::Project(pkgs)) = value else {
                        return Err(PackError::configuration(
                            "the 'resolve-project' hook yielded no package graph; hook one",
                        ));
                    };
                    tracing::debug!(packages = pkgs.len(), "package graph committed");
                    runner.context().set_pkgs(pkgs)?;

                    let config = runner.context().config()?;
                    let pre = match config.meta {
                        MetaSource::Local => Manifest::load(&config.meta_path()).await?,
                        MetaSource::Fresh => Manifest::default(),
                    };
                    let mut state = runner.context().state.lock().await;
                    state.pre = pre;
                    state.cur = Manifest::default();
                    Ok(())
                }),
            )
            .with_hooks(&["resolve-project"]),
        )
    }))
}

/// Configuration followed by project resolution. `set_project` reads the
/// committed config to locate the manifest, so the two run in series.
pub fn set_context() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| series(vec![set_config(), set_project()])))
}

/// Handler that yields a fixed package graph.
pub fn provide_project(pkgs: PkgGraph) -> HookFn {
    hook_fn(move |_args| {
        let pkgs = pkgs.clone();
        async move { Ok(Some(HookValue::Project(pkgs))) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use crate::context::BuildContext;
    use crate::processor::TaskRunner;
    use crate::project::{ModuleSnapshot, META_JSON};
    use crate::tasks::config::provide_config;

    fn sample_pkgs() -> PkgGraph {
        let mut pkgs = PkgGraph::new();
        let app = pkgs.add_pkg("app", "1.0.0", true);
        let lib = pkgs.add_pkg("lib", "2.0.0", false);
        pkgs.add_dependency(app, lib);
        pkgs
    }

    #[tokio::test]
    async fn commits_the_project_and_loads_the_previous_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest {
            modules: vec![ModuleSnapshot::new("lib@2.0.0")],
        };
        manifest
            .save(&dir.path().join("dist").join(META_JSON))
            .await
            .unwrap();

        let runner = TaskRunner::new(BuildContext::new());
        let task = runner.task(&set_context()).unwrap();
        task.hook(
            "get-config",
            provide_config(UserConfig {
                cwd: Some(dir.path().to_path_buf()),
                ..UserConfig::default()
            }),
        )
        .unwrap();
        task.hook("resolve-project", provide_project(sample_pkgs())).unwrap();
        task.run(&runner, false).await.unwrap();

        assert_eq!(runner.context().pkgs().unwrap().len(), 2);
        let state = runner.context().state.lock().await;
        assert_eq!(state.pre, manifest);
        assert!(state.cur.modules.is_empty());
    }

    #[tokio::test]
    async fn a_fresh_meta_source_starts_from_an_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        Manifest {
            modules: vec![ModuleSnapshot::new("stale@1.0.0")],
        }
        .save(&dir.path().join("dist").join(META_JSON))
        .await
        .unwrap();

        let runner = TaskRunner::new(BuildContext::new());
        let task = runner.task(&set_context()).unwrap();
        task.hook(
            "get-config",
            provide_config(UserConfig {
                cwd: Some(dir.path().to_path_buf()),
                meta: crate::config::MetaSource::Fresh,
                ..UserConfig::default()
            }),
        )
        .unwrap();
        task.hook("resolve-project", provide_project(sample_pkgs())).unwrap();
        task.run(&runner, false).await.unwrap();

        let state = runner.context().state.lock().await;
        assert!(state.pre.modules.is_empty());
    }

    #[tokio::test]
    async fn fails_without_a_resolve_project_hook() {
        let dir = tempfile::tempdir().unwrap();
        let runner = TaskRunner::new(BuildContext::new());
        let task = runner.task(&set_context()).unwrap();
        task.hook(
            "get-config",
            provide_config(UserConfig {
                cwd: Some(dir.path().to_path_buf()),
                ..UserConfig::default()
            }),
        )
        .unwrap();
        assert!(matches!(
            task.run(&runner, false).await,
            Err(PackError::Configuration { .. })
        ));
    }
}
