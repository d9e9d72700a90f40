// SPDX-License-Identifier: MIT

//! The versioned vendor module graph the scheduler runs over.

use std::collections::HashMap;

use crate::context::BuildState;
use crate::errors::PackError;
use crate::project::{PkgGraph, PkgIdx};

/// One schedulable vendor module.
#[derive(Debug)]
pub(crate) struct VendorNode {
    /// Versioned module name, `name@version`.
    pub id: String,
    pub pkg: PkgIdx,
    /// Indices of vendor nodes whose module imports this one.
    pub dependents: Vec<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct VendorGraph {
    pub nodes: Vec<VendorNode>,
    by_id: HashMap<String, usize>,
}

impl VendorGraph {
    /// Builds the vendor graph from every externalized non-local package.
    /// Also seeds the current manifest with a blank snapshot (carrying the
    /// computed externals) for each vendor module.
    pub fn build(pkgs: &PkgGraph, state: &mut BuildState) -> Result<VendorGraph, PackError> {
        let mut graph = VendorGraph::default();
        for idx in pkgs.indices() {
            if pkgs.node(idx).local || !pkgs.should_external(idx) {
                continue;
            }
            let id = pkgs.versioned_name(idx);
            let node = graph.intern(&id, idx);
            let externals = pkgs.vendor_externals(idx);
            state.snapshot_mut(&id, Some(externals.clone()));
            for public_name in &externals {
                let dep = pkgs.pkg_from_public_name(idx, public_name)?;
                let dep_node = graph.intern(&pkgs.versioned_name(dep), dep);
                if dep_node != node && !graph.nodes[dep_node].dependents.contains(&node) {
                    graph.nodes[dep_node].dependents.push(node);
                }
            }
        }
        Ok(graph)
    }

    pub(crate) fn intern(&mut self, id: &str, pkg: PkgIdx) -> usize {
        if let Some(&existing) = self.by_id.get(id) {
            return existing;
        }
        self.nodes.push(VendorNode {
            id: id.to_string(),
            pkg,
            dependents: Vec::new(),
        });
        self.by_id.insert(id.to_string(), self.nodes.len() - 1);
        self.nodes.len() - 1
    }
}
