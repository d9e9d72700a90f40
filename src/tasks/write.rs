// SPDX-License-Identifier: MIT

//! `write_manifest`: persists the assembled manifest to the dist directory.

use std::sync::{Arc, OnceLock};

use crate::processor::{action_fn, TaskOptions};

pub fn write_manifest() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| {
        Arc::new(TaskOptions::new(
            "write-manifest",
            action_fn(|_task, runner| async move {
                let path = runner.context().config()?.meta_path();
                let state = runner.context().state.lock().await;
                state.cur.save(&path).await?;
                tracing::info!(path = %path.display(), modules = state.cur.modules.len(), "manifest written");
                Ok(())
            }),
        ))
    }))
}
