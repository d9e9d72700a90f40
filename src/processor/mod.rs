// SPDX-License-Identifier: MIT

//! Hook-driven task engine.
//!
//! Descriptors ([`TaskOptions`]) describe work; a [`TaskRunner`] turns them
//! into memoized [`Task`] instances wired to [`HookDriver`]s; [`series`] and
//! [`parallel`] compose descriptors into pipelines.

pub mod compose;
pub mod hook_driver;
pub mod options;
pub mod runner;
pub mod task;

pub use compose::{parallel, series};
pub use hook_driver::{
    hook_fn, BoxFuture, HookArgs, HookDriver, HookFn, HookResult, HookType, HookValue,
};
pub use options::{action_fn, ActionFn, TaskOptions};
pub use runner::TaskRunner;
pub use task::Task;
