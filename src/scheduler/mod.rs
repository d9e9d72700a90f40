// SPDX-License-Identifier: MIT

//! Incremental vendor module scheduling.

pub mod builder;
pub(crate) mod circle;
pub(crate) mod graph;
pub mod vendor;


pub use builder::{builder_hook, ModuleBuilder};
pub use vendor::build_vendor_modules;
