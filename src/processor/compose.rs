// SPDX-License-Identifier: MIT

//! `series` / `parallel` task combinators.
//!
//! Both produce a parent descriptor whose children are registered for hook
//! resolution, so hooks declared anywhere in the composed tree can be
//! registered and called through the root task.

use std::sync::Arc;

use crate::errors::PackError;
use crate::processor::options::{action_fn, TaskOptions};

/// Runs the child tasks one after another, stopping at the first failure.
pub fn series(children: Vec<Arc<TaskOptions>>) -> Arc<TaskOptions> {
    let action_children = children.clone();
    let action = action_fn(move |_task, runner| {
        let children = action_children.clone();
        async move {
            for child in &children {
                let task = runner.task(child)?;
                task.run(&runner, false).await?;
            }
            Ok(())
        }
    });
    Arc::new(TaskOptions::new("series", action).with_children(children))
}

/// Runs the child tasks concurrently and waits for all of them. The first
/// failure (in child order) is returned; siblings still run to completion.
pub fn parallel(children: Vec<Arc<TaskOptions>>) -> Arc<TaskOptions> {
    let action_children = children.clone();
    let action = action_fn(move |_task, runner| {
        let children = action_children.clone();
        async move {
            let mut handles = Vec::with_capacity(children.len());
            for child in &children {
                let task = runner.task(child)?;
                let runner = Arc::clone(&runner);
                handles.push(tokio::spawn(async move { task.run(&runner, false).await }));
            }
            let mut first_error = None;
            for handle in handles {
                match handle.await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        first_error.get_or_insert(err);
                    }
                    Err(err) => {
                        first_error.get_or_insert(PackError::internal(format!(
                            "parallel child panicked: {err}"
                        )));
                    }
                }
            }
            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    });
    Arc::new(TaskOptions::new("parallel", action).with_children(children))
}
