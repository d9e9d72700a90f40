// SPDX-License-Identifier: MIT

//! Built-in pipeline stages.
//!
//! Each stage is a descriptor factory returning a process-wide singleton, so
//! pipelines that compose overlapping stages (the vendor stage includes the
//! local stage, which includes the context stage) still run each stage once
//! per [`TaskRunner`](crate::processor::TaskRunner).

pub mod config;
pub mod local;
pub mod project;
pub mod write;

use std::sync::{Arc, OnceLock};

use crate::processor::{series, TaskOptions};
use crate::scheduler::build_vendor_modules;

pub use config::{provide_config, set_config};
pub use local::build_local_modules;
pub use project::{provide_project, set_context, set_project};
pub use write::write_manifest;

/// The whole build: local modules, vendor modules, manifest.
pub fn build() -> Arc<TaskOptions> {
    static OPTIONS: OnceLock<Arc<TaskOptions>> = OnceLock::new();
    Arc::clone(OPTIONS.get_or_init(|| series(vec![build_vendor_modules(), write_manifest()])))
}
