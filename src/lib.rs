// SPDX-License-Identifier: MIT

//! Incremental, cycle-aware build orchestrator for micro-frontend projects.
//!
//! The crate has two halves. The [`processor`] module is a generic
//! hook-driven task engine: descriptors, memoized task instances, named
//! hooks with first/sequential/parallel call semantics and `series` /
//! `parallel` composition. The [`scheduler`] and [`tasks`] modules build the
//! packer on top of it: local modules are built through hooks, the vendor
//! scheduler diffs the bindings consumed from each shared dependency against
//! the previous run's manifest and rebuilds only what changed, converging
//! circular dependency groups until their binding sets stabilize.
//!
//! Bundler invocation is deliberately not part of the crate; embedders hook
//! a [`scheduler::ModuleBuilder`] (or plain hook handlers) into the
//! pipeline's `build-local-module` / `build-vendor-module` hooks.

pub mod config; // user configuration and YAML loader
pub mod context; // shared per-run state
pub mod errors; // PackError taxonomy
pub mod observability; // structured logging
pub mod processor; // hook-driven task engine
pub mod project; // package graph and manifest model
pub mod scheduler; // vendor module scheduling
pub mod tasks; // built-in pipeline stages

pub use config::{Config, MetaSource, UserConfig};
pub use context::{BuildContext, BuildState};
pub use errors::PackError;
pub use processor::{HookArgs, HookType, HookValue, TaskRunner};
pub use project::{Manifest, ModuleImport, ModuleSnapshot, PkgGraph, PkgIdx};
