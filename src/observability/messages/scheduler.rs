// SPDX-License-Identifier: MIT

//! Vendor scheduler events.

use std::fmt;

use crate::observability::StructuredLog;

pub struct WaveDispatched<'a> {
    pub pass: usize,
    pub modules: &'a [String],
}

impl fmt::Display for WaveDispatched<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pass {} dispatching {} vendor module build(s): {}",
            self.pass,
            self.modules.len(),
            self.modules.join(", ")
        )
    }
}

impl StructuredLog for WaveDispatched<'_> {
    fn log(&self) {
        tracing::info!(pass = self.pass, count = self.modules.len(), "{}", self);
    }
}

pub struct ModuleUnchanged<'a> {
    pub module: &'a str,
}

impl fmt::Display for ModuleUnchanged<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vendor module '{}' is unchanged, carrying the previous build forward",
            self.module
        )
    }
}

impl StructuredLog for ModuleUnchanged<'_> {
    fn log(&self) {
        tracing::debug!(module = self.module, "{}", self);
    }
}

pub struct ModuleRemoved<'a> {
    pub module: &'a str,
}

impl fmt::Display for ModuleRemoved<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vendor module '{}' has no consumers left, dropping it",
            self.module
        )
    }
}

impl StructuredLog for ModuleRemoved<'_> {
    fn log(&self) {
        tracing::debug!(module = self.module, "{}", self);
    }
}

pub struct CircleConverging<'a> {
    pub round: usize,
    pub modules: &'a [String],
}

impl fmt::Display for CircleConverging<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "circular group round {}: rebuilding {}",
            self.round,
            self.modules.join(", ")
        )
    }
}

impl StructuredLog for CircleConverging<'_> {
    fn log(&self) {
        tracing::debug!(round = self.round, "{}", self);
    }
}
