// SPDX-License-Identifier: MIT

//! Immutable task descriptors.
//!
//! A [`TaskOptions`] value describes a task: its action, the hook names it
//! declares and the child descriptors it composes. Descriptors are shared as
//! `Arc`s and identified by allocation, so requesting a task for the same
//! descriptor twice within one [`TaskRunner`](super::TaskRunner) yields the
//! same memoized instance.

use std::future::Future;
use std::sync::Arc;

use crate::errors::PackError;
use crate::processor::hook_driver::{BoxFuture, HookFn};
use crate::processor::{Task, TaskRunner};

/// The body of a task. Receives the task instance (for hook calls) and the
/// runner (for child task lookup and the shared build context).
pub type ActionFn =
    Arc<dyn Fn(Arc<Task>, Arc<TaskRunner>) -> BoxFuture<Result<(), PackError>> + Send + Sync>;

/// Wraps an async closure into an [`ActionFn`].
pub fn action_fn<F, Fut>(f: F) -> ActionFn
where
    F: Fn(Arc<Task>, Arc<TaskRunner>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), PackError>> + Send + 'static,
{
    Arc::new(move |task, runner| Box::pin(f(task, runner)))
}

pub struct TaskOptions {
    name: &'static str,
    action: ActionFn,
    hook_names: Vec<&'static str>,
    default_hooks: Vec<(&'static str, HookFn)>,
    children: Vec<Arc<TaskOptions>>,
}

impl TaskOptions {
    pub fn new(name: &'static str, action: ActionFn) -> Self {
        TaskOptions {
            name,
            action,
            hook_names: Vec::new(),
            default_hooks: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Declares the hook names tasks built from this descriptor understand.
    pub fn with_hooks(mut self, names: &[&'static str]) -> Self {
        self.hook_names.extend_from_slice(names);
        self
    }

    /// Registers a handler that is hooked automatically on every task built
    /// from this descriptor.
    pub fn with_default_hook(mut self, name: &'static str, handler: HookFn) -> Self {
        self.default_hooks.push((name, handler));
        self
    }

    pub fn with_children(mut self, children: Vec<Arc<TaskOptions>>) -> Self {
        self.children = children;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn action(&self) -> ActionFn {
        Arc::clone(&self.action)
    }

    pub(crate) fn hook_names(&self) -> &[&'static str] {
        &self.hook_names
    }

    pub(crate) fn default_hooks(&self) -> &[(&'static str, HookFn)] {
        &self.default_hooks
    }

    pub(crate) fn children(&self) -> &[Arc<TaskOptions>] {
        &self.children
    }
}

impl std::fmt::Debug for TaskOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskOptions")
            .field("name", &self.name)
            .field("hook_names", &self.hook_names)
            .field("children", &self.children.len())
            .finish()
    }
}
