// SPDX-License-Identifier: MIT

//! Shared build context.
//!
//! One [`BuildContext`] lives behind an `Arc` for the duration of a run.
//! Config and package graph are write-once; the mutable [`BuildState`] is
//! guarded by a mutex and only locked between scheduling decisions, never
//! across hook dispatch.

use std::sync::OnceLock;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::errors::PackError;
use crate::project::{BindingMap, Manifest, ModuleSnapshot, PkgGraph};

/// Mutable state of one build run.
#[derive(Debug, Default)]
pub struct BuildState {
    /// Manifest of the previous run.
    pub pre: Manifest,
    /// Manifest being assembled by this run.
    pub cur: Manifest,
    /// Bindings each module had to provide in the previous run.
    pub bindings_pre: BindingMap,
    /// Bindings each module has to provide in this run.
    pub bindings_cur: BindingMap,
}

impl BuildState {
    /// Returns the current snapshot for `id`, inserting a blank one (with
    /// the given externals) on first access.
    pub fn snapshot_mut(&mut self, id: &str, externals: Option<Vec<String>>) -> &mut ModuleSnapshot {
        let pos = match self.cur.modules.iter().position(|m| m.id == id) {
            Some(pos) => pos,
            None => {
                let mut snapshot = ModuleSnapshot::new(id);
                if let Some(externals) = externals {
                    snapshot.externals = externals;
                }
                self.cur.modules.push(snapshot);
                self.cur.modules.len() - 1
            }
        };
        &mut self.cur.modules[pos]
    }

    /// Replaces the current snapshot with the same id, or appends it.
    pub fn add_snapshot(&mut self, snapshot: ModuleSnapshot) {
        match self.cur.find_mut(&snapshot.id) {
            Some(existing) => *existing = snapshot,
            None => self.cur.modules.push(snapshot),
        }
    }

    /// Drops a module from the current manifest. Its binding map entry is
    /// kept (the scheduler records the empty set there), so convergence
    /// passes over a circle do not mistake the removal for a change.
    pub fn remove(&mut self, id: &str) {
        self.cur.modules.retain(|m| m.id != id);
    }
}

pub struct BuildContext {
    config: OnceLock<Config>,
    pkgs: OnceLock<PkgGraph>,
    pub state: Mutex<BuildState>,
}

impl BuildContext {
    pub fn new() -> Self {
        BuildContext {
            config: OnceLock::new(),
            pkgs: OnceLock::new(),
            state: Mutex::new(BuildState::default()),
        }
    }

    pub fn set_config(&self, config: Config) -> Result<(), PackError> {
        self.config
            .set(config)
            .map_err(|_| PackError::internal("configuration was committed twice"))
    }

    pub fn config(&self) -> Result<&Config, PackError> {
        self.config
            .get()
            .ok_or_else(|| PackError::configuration("no configuration committed yet"))
    }

    pub fn set_pkgs(&self, pkgs: PkgGraph) -> Result<(), PackError> {
        self.pkgs
            .set(pkgs)
            .map_err(|_| PackError::internal("package graph was committed twice"))
    }

    pub fn pkgs(&self) -> Result<&PkgGraph, PackError> {
        self.pkgs
            .get()
            .ok_or_else(|| PackError::configuration("no package graph committed yet"))
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        BuildContext::new()
    }
}
