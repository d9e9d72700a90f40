// SPDX-License-Identifier: MIT

//! Arena-backed package graph.
//!
//! Nodes are addressed by [`PkgIdx`]; both edge directions are maintained so
//! the externalization predicate and the scheduler can walk dependents
//! without re-deriving them.

use std::collections::VecDeque;

use crate::errors::PackError;
use crate::project::{PACKAGE_NAME_SEP, VERSIONED_VENDOR_SEP};

/// Index of a package inside a [`PkgGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PkgIdx(usize);

#[derive(Debug, Clone)]
pub struct PkgNode {
    pub name: String,
    pub version: String,
    pub local: bool,
    pub dependents: Vec<PkgIdx>,
    pub dependencies: Vec<PkgIdx>,
}

#[derive(Debug, Clone, Default)]
pub struct PkgGraph {
    nodes: Vec<PkgNode>,
}

impl PkgGraph {
    pub fn new() -> Self {
        PkgGraph::default()
    }

    pub fn add_pkg(
        &mut self,
        name: impl Into<String>,
        version: impl Into<String>,
        local: bool,
    ) -> PkgIdx {
        self.nodes.push(PkgNode {
            name: name.into(),
            version: version.into(),
            local,
            dependents: Vec::new(),
            dependencies: Vec::new(),
        });
        PkgIdx(self.nodes.len() - 1)
    }

    /// Records that `from` depends on `to`, maintaining both edge lists.
    pub fn add_dependency(&mut self, from: PkgIdx, to: PkgIdx) {
        if !self.nodes[from.0].dependencies.contains(&to) {
            self.nodes[from.0].dependencies.push(to);
        }
        if !self.nodes[to.0].dependents.contains(&from) {
            self.nodes[to.0].dependents.push(from);
        }
    }

    pub fn node(&self, idx: PkgIdx) -> &PkgNode {
        &self.nodes[idx.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = PkgIdx> {
        (0..self.nodes.len()).map(PkgIdx)
    }

    pub fn local_pkgs(&self) -> impl Iterator<Item = PkgIdx> + '_ {
        self.indices().filter(|&idx| self.node(idx).local)
    }

    pub fn find(&self, name: &str, version: &str) -> Option<PkgIdx> {
        self.indices()
            .find(|&idx| self.node(idx).name == name && self.node(idx).version == version)
    }

    /// A package gets its own vendor module when more than one package
    /// depends on it, or when any dependent is a local package.
    pub fn should_external(&self, idx: PkgIdx) -> bool {
        let node = self.node(idx);
        node.dependents.len() > 1
            || node
                .dependents
                .iter()
                .any(|&dependent| self.node(dependent).local)
    }

    /// `name@version`, the identity of a vendor package across the build.
    pub fn versioned_name(&self, idx: PkgIdx) -> String {
        let node = self.node(idx);
        format!(
            "{}{}{}",
            node.name, VERSIONED_VENDOR_SEP, node.version
        )
    }

    /// The module name a package builds into: the bare package name for
    /// local packages, the versioned name for vendors.
    pub fn module_name(&self, idx: PkgIdx) -> String {
        let node = self.node(idx);
        if node.local {
            node.name.clone()
        } else {
            self.versioned_name(idx)
        }
    }

    /// Whether `module` belongs to a local package (the package's own module
    /// or a sub-path module under it).
    pub fn is_local_module(&self, module: &str) -> bool {
        self.local_pkgs().any(|idx| {
            let name = &self.node(idx).name;
            module == name || module.starts_with(&format!("{name}/"))
        })
    }

    pub fn is_vendor_module(&self, module: &str) -> bool {
        !self.is_local_module(module)
    }

    /// Resolves a module name back to its package. Vendor module names are
    /// split at the version separator; a leading separator (scoped package
    /// names) is not a split point.
    pub fn pkg_by_module_name(&self, module: &str) -> Result<PkgIdx, PackError> {
        if self.is_local_module(module) {
            return self
                .local_pkgs()
                .find(|&idx| {
                    let name = &self.node(idx).name;
                    module == name || module.starts_with(&format!("{name}/"))
                })
                .ok_or_else(|| {
                    PackError::graph_invariant(format!("no local package for module '{module}'"))
                });
        }
        let sep = module[1..]
            .find(VERSIONED_VENDOR_SEP)
            .map(|pos| pos + 1)
            .ok_or_else(|| {
                PackError::graph_invariant(format!("'{module}' is not a versioned module name"))
            })?;
        let (name, version) = (&module[..sep], &module[sep + 1..]);
        self.find(name, version).ok_or_else(|| {
            PackError::graph_invariant(format!("no package '{name}' at version '{version}'"))
        })
    }

    /// Shortest dependency path from `start` to `end` (inclusive of `end`,
    /// exclusive of `start`), found breadth-first.
    pub fn dep_path(&self, start: PkgIdx, end: PkgIdx) -> Result<Vec<PkgIdx>, PackError> {
        if start == end {
            return Ok(Vec::new());
        }
        let mut parent: Vec<Option<PkgIdx>> = vec![None; self.nodes.len()];
        let mut queue = VecDeque::from([start]);
        while let Some(at) = queue.pop_front() {
            for &dep in &self.node(at).dependencies {
                if dep != start && parent[dep.0].is_none() {
                    parent[dep.0] = Some(at);
                    if dep == end {
                        let mut path = vec![end];
                        let mut cursor = at;
                        while cursor != start {
                            path.push(cursor);
                            cursor = parent[cursor.0].ok_or_else(|| {
                                PackError::internal("broken parent chain in dep_path")
                            })?;
                        }
                        path.reverse();
                        return Ok(path);
                    }
                    queue.push_back(dep);
                }
            }
        }
        Err(PackError::graph_invariant(format!(
            "package '{}' does not depend on '{}'",
            self.node(start).name,
            self.node(end).name
        )))
    }

    /// Public package name for a dependency path: the package names joined
    /// by the namespace separator. A direct dependency's public name is its
    /// bare package name.
    pub fn public_pkg_name(&self, path: &[PkgIdx]) -> String {
        path.iter()
            .map(|&idx| self.node(idx).name.as_str())
            .collect::<Vec<_>>()
            .join(PACKAGE_NAME_SEP)
    }

    /// Resolves a public package name back to a package by walking the
    /// dependency edges from `parent` segment by segment.
    pub fn pkg_from_public_name(
        &self,
        parent: PkgIdx,
        public_name: &str,
    ) -> Result<PkgIdx, PackError> {
        let mut at = parent;
        for segment in public_name.split(PACKAGE_NAME_SEP) {
            at = self
                .node(at)
                .dependencies
                .iter()
                .copied()
                .find(|&dep| self.node(dep).name == segment)
                .ok_or_else(|| {
                    PackError::graph_invariant(format!(
                        "'{}' has no dependency '{}' while resolving '{}'",
                        self.node(at).name,
                        segment,
                        public_name
                    ))
                })?;
        }
        Ok(at)
    }

    /// The externals of a vendor module: the public names of every
    /// externalized package reachable from `idx` without crossing another
    /// externalized package. Sorted for stable comparison.
    pub fn vendor_externals(&self, idx: PkgIdx) -> Vec<String> {
        let mut externals = Vec::new();
        let mut path = Vec::new();
        self.collect_externals(idx, &mut path, &mut externals);
        externals.sort();
        externals.dedup();
        externals
    }

    fn collect_externals(&self, at: PkgIdx, path: &mut Vec<PkgIdx>, externals: &mut Vec<String>) {
        for &dep in &self.node(at).dependencies {
            if path.contains(&dep) {
                continue;
            }
            path.push(dep);
            if self.should_external(dep) {
                externals.push(self.public_pkg_name(path));
            } else {
                self.collect_externals(dep, path, externals);
            }
            path.pop();
        }
    }
}
