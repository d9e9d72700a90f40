// SPDX-License-Identifier: MIT

//! Error taxonomy for the packer.
//!
//! Every fallible operation in the crate returns [`PackError`]. The enum is
//! `Clone + PartialEq` because task results are memoized and handed out to
//! every awaiter of the same task instance.

use thiserror::Error;

/// Errors surfaced by configuration, scheduling and build callbacks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackError {
    /// Required configuration is missing or unusable.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The package graph or vendor graph violated an invariant the
    /// scheduler relies on (unresolvable dependency path, a pass that can
    /// make no progress, an unknown module name).
    #[error("dependency graph invariant violated: {message}")]
    GraphInvariant { message: String },

    /// A `build-local-module` / `build-vendor-module` hook reported failure.
    #[error("build callback for module '{module}' failed: {reason}")]
    BuildCallback { module: String, reason: String },

    /// A hook name was used that neither the task nor any of its children
    /// declares.
    #[error("hook '{hook}' is not declared on task '{task}' or any of its children")]
    IllegalHookInvocation { hook: String, task: String },

    /// A module stopped exporting a binding that other modules still import.
    #[error("module '{module}' no longer exports '{binding}', but {dependents:?} still import it")]
    ExportRemoved {
        module: String,
        binding: String,
        dependents: Vec<String>,
    },

    /// The build manifest could not be read or written.
    #[error("manifest error at '{path}': {reason}")]
    Manifest { path: String, reason: String },

    /// Runtime failures that should not occur under correct usage, such as
    /// a panicked spawned build.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl PackError {
    pub fn configuration(message: impl Into<String>) -> Self {
        PackError::Configuration {
            message: message.into(),
        }
    }

    pub fn graph_invariant(message: impl Into<String>) -> Self {
        PackError::GraphInvariant {
            message: message.into(),
        }
    }

    pub fn build_callback(module: impl Into<String>, reason: impl Into<String>) -> Self {
        PackError::BuildCallback {
            module: module.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PackError::Internal {
            message: message.into(),
        }
    }
}
