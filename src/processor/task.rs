// SPDX-License-Identifier: MIT

//! Memoized task instances.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::errors::PackError;
use crate::observability::messages::task::{TaskFinished, TaskSkipped, TaskStarted};
use crate::observability::StructuredLog;
use crate::processor::hook_driver::{HookArgs, HookDriver, HookFn, HookType, HookValue};
use crate::processor::{TaskOptions, TaskRunner};

/// A task built from a [`TaskOptions`] descriptor.
///
/// Each instance runs its action at most once per runner; later `run` calls
/// (and concurrent ones) observe the memoized result unless `force` is set.
pub struct Task {
    options: Arc<TaskOptions>,
    driver: Arc<HookDriver>,
    children: Vec<Arc<Task>>,
    result: Mutex<Option<Result<(), PackError>>>,
}

impl Task {
    pub(crate) fn new(
        options: Arc<TaskOptions>,
        children: Vec<Arc<Task>>,
    ) -> Result<Arc<Task>, PackError> {
        let driver = Arc::new(HookDriver::new(options.name(), options.hook_names()));
        for child in &children {
            driver.add_child(Arc::clone(&child.driver));
        }
        for (name, handler) in options.default_hooks() {
            driver.hook(name, handler.clone())?;
        }
        Ok(Arc::new(Task {
            options,
            driver,
            children,
            result: Mutex::new(None),
        }))
    }

    pub fn name(&self) -> &'static str {
        self.options.name()
    }

    pub(crate) fn options(&self) -> &Arc<TaskOptions> {
        &self.options
    }

    pub(crate) fn children(&self) -> &[Arc<Task>] {
        &self.children
    }

    /// Appends a handler to the named hook of this task or one of its
    /// descendants.
    pub fn hook(&self, name: &str, handler: HookFn) -> Result<(), PackError> {
        self.driver.hook(name, handler)
    }

    /// Inserts a handler ahead of the existing handlers of the named hook.
    pub fn prepend(&self, name: &str, handler: HookFn) -> Result<(), PackError> {
        self.driver.prepend(name, handler)
    }

    /// Removes the most recently registered occurrence of `handler`.
    pub fn unhook(&self, name: &str, handler: &HookFn) -> Result<(), PackError> {
        self.driver.unhook(name, handler)
    }

    /// Invokes a hook declared by this task or one of its descendants.
    pub async fn call(
        &self,
        name: &str,
        hook_type: HookType,
        args: HookArgs,
    ) -> Result<Option<HookValue>, PackError> {
        self.driver.call(name, hook_type, args).await
    }

    /// Runs the task action, memoizing its result. Concurrent callers await
    /// the same execution; `force` discards the memoized result and runs
    /// the action again.
    pub async fn run(
        self: &Arc<Self>,
        runner: &Arc<TaskRunner>,
        force: bool,
    ) -> Result<(), PackError> {
        let mut slot = self.result.lock().await;
        if !force {
            if let Some(result) = slot.as_ref() {
                TaskSkipped { name: self.name() }.log();
                return result.clone();
            }
        }
        TaskStarted { name: self.name() }.log();
        let action = self.options.action();
        let result = action(Arc::clone(self), Arc::clone(runner)).await;
        TaskFinished {
            name: self.name(),
            ok: result.is_ok(),
        }
        .log();
        *slot = Some(result.clone());
        result
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("children", &self.children.len())
            .finish()
    }
}
