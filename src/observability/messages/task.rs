// SPDX-License-Identifier: MIT

//! Task engine events.

use std::fmt;

use crate::observability::StructuredLog;

pub struct TaskStarted {
    pub name: &'static str,
}

impl fmt::Display for TaskStarted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' started", self.name)
    }
}

impl StructuredLog for TaskStarted {
    fn log(&self) {
        tracing::debug!(task = self.name, "{}", self);
    }
}

pub struct TaskFinished {
    pub name: &'static str,
    pub ok: bool,
}

impl fmt::Display for TaskFinished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task '{}' {}",
            self.name,
            if self.ok { "finished" } else { "failed" }
        )
    }
}

impl StructuredLog for TaskFinished {
    fn log(&self) {
        if self.ok {
            tracing::debug!(task = self.name, "{}", self);
        } else {
            tracing::warn!(task = self.name, "{}", self);
        }
    }
}

pub struct TaskSkipped {
    pub name: &'static str,
}

impl fmt::Display for TaskSkipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task '{}' already ran, reusing its result", self.name)
    }
}

impl StructuredLog for TaskSkipped {
    fn log(&self) {
        tracing::trace!(task = self.name, "{}", self);
    }
}
