// SPDX-License-Identifier: MIT

//! `build_local_modules`: builds every local package's module through the
//! `build-local-module` hook, derives the binding maps and checks that no
//! module stopped exporting a binding others still import.

use std::sync::{Arc, OnceLock};

use crate::errors::PackError;
use crate::processor::{action_fn, series, HookArgs, HookType, TaskOptions};
use crate::tasks::project::set_context;

/// Full local stage: context, builds, binding derivation, export QA.
pub fn build_local_modules() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        series(vec![
            set_context(),
            local_build_stage(),
            derive_binding_maps(),
            check_exports(),
        ])
    }))
}

fn local_build_stage() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        Arc::new(
            TaskOptions::new(
                "build-local-modules",
                action_fn(|task, runner| async move {
                    let pkgs = runner.context().pkgs()?;
                    let modules: Vec<String> =
                        pkgs.local_pkgs().map(|idx| pkgs.module_name(idx)).collect();
                    let mut handles = Vec::with_capacity(modules.len());
                    for module in modules {
                        let task = Arc::clone(&task);
                        let context = Arc::clone(runner.context());
                        handles.push(tokio::spawn(async move {
                            task.call(
                                "build-local-module",
                                HookType::Parallel,
                                HookArgs::for_module(&context, module),
                            )
                            .await
                            .map(|_| ())
                        }));
                    }
                    for handle in handles {
                        match handle.await {
                            Ok(result) => result?,
                            Err(err) => {
                                return Err(PackError::internal(format!(
                                    "local module build panicked: {err}"
                                )));
                            }
                        }
                    }
                    Ok(())
                }),
            )
            .with_hooks(&["build-local-module"]),
        )
    }))
}

/// Derives which bindings each module had to provide before and has to
/// provide now, from the imports recorded in the two manifests.
fn derive_binding_maps() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        Arc::new(TaskOptions::new(
            "derive-binding-maps",
            action_fn(|_task, runner| async move {
                let mut state = runner.context().state.lock().await;
                state.bindings_pre = state.pre.binding_map();
                state.bindings_cur = state.cur.binding_map();
                Ok(())
            }),
        ))
    }))
}

/// Fails the build when a freshly built module no longer exports a binding
/// some other module still imports.
fn check_exports() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        Arc::new(TaskOptions::new(
            "check-exports",
            action_fn(|_task, runner| async move {
                let state = runner.context().state.lock().await;
                for module in &state.cur.modules {
                    let Some(exports) = &module.exports else {
                        continue;
                    };
                    let Some(needed) = state.bindings_cur.get(&module.id) else {
                        continue;
                    };
                    let Some(missing) = needed.iter().find(|b| !exports.contains(b)) else {
                        continue;
                    };
                    let dependents: Vec<String> = state
                        .cur
                        .modules
                        .iter()
                        .filter(|m| {
                            m.imports
                                .iter()
                                .any(|i| i.id == module.id && i.bindings.contains(missing))
                        })
                        .map(|m| m.id.clone())
                        .collect();
                    return Err(PackError::ExportRemoved {
                        module: module.id.clone(),
                        binding: missing.clone(),
                        dependents,
                    });
                }
                Ok(())
            }),
        ))
    }))
}
