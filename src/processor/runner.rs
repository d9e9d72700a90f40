// SPDX-License-Identifier: MIT

//! Per-run task table.

use std::sync::{Arc, Mutex};

use crate::context::BuildContext;
use crate::errors::PackError;
use crate::processor::{Task, TaskOptions};

/// Owns the shared [`BuildContext`] and the descriptor-to-instance table for
/// one build run. Two `task` calls with the same descriptor allocation yield
/// the same instance, so a descriptor composed into several pipelines runs
/// exactly once.
pub struct TaskRunner {
    context: Arc<BuildContext>,
    tasks: Mutex<Vec<(usize, Arc<Task>)>>,
}

impl TaskRunner {
    pub fn new(context: BuildContext) -> Arc<Self> {
        Arc::new(TaskRunner {
            context: Arc::new(context),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn context(&self) -> &Arc<BuildContext> {
        &self.context
    }

    /// Returns the task instance for `options`, building it (and its
    /// children, recursively) on first request.
    pub fn task(&self, options: &Arc<TaskOptions>) -> Result<Arc<Task>, PackError> {
        let key = Arc::as_ptr(options) as usize;
        if let Some(existing) = self.lookup(key) {
            return Ok(existing);
        }
        // Children are built outside the table lock; the recursion may need
        // to insert them first.
        let children = options
            .children()
            .iter()
            .map(|child| self.task(child))
            .collect::<Result<Vec<_>, _>>()?;
        let task = Task::new(Arc::clone(options), children)?;
        let mut tasks = self.tasks.lock().unwrap();
        if let Some((_, existing)) = tasks.iter().find(|(k, _)| *k == key) {
            return Ok(Arc::clone(existing));
        }
        tasks.push((key, Arc::clone(&task)));
        Ok(task)
    }

    /// Convenience wrapper: resolve the task for `options` and run it.
    pub async fn run(self: &Arc<Self>, options: &Arc<TaskOptions>) -> Result<(), PackError> {
        let task = self.task(options)?;
        task.run(self, false).await
    }

    fn lookup(&self, key: usize) -> Option<Arc<Task>> {
        let tasks = self.tasks.lock().unwrap();
        tasks
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, task)| Arc::clone(task))
    }
}
