// SPDX-License-Identifier: MIT

//! Structured logging for build events.

pub mod messages;

/// Message types that know how to emit themselves through `tracing`.
pub trait StructuredLog {
    fn log(&self);
}

/// Installs a `tracing` subscriber honoring `RUST_LOG`. Safe to call more
/// than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
