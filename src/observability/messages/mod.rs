// SPDX-License-Identifier: MIT

//! Structured log messages, grouped by subsystem.

pub mod scheduler;
pub mod task;
