// SPDX-License-Identifier: MIT

//! Build manifest: per-module snapshots persisted between runs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::PackError;

/// An import recorded in a module snapshot.
///
/// `name` is the public package name the importing code used, `id` the
/// versioned module name it resolved to at build time. The binding `"*"`
/// stands for a namespace import, the empty binding for a pure side-effect
/// import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleImport {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bindings: Vec<String>,
}

/// What one build of a module looked like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub id: String,
    #[serde(default)]
    pub externals: Vec<String>,
    #[serde(default)]
    pub imports: Vec<ModuleImport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Vec<String>>,
}

impl ModuleSnapshot {
    pub fn new(id: impl Into<String>) -> Self {
        ModuleSnapshot {
            id: id.into(),
            externals: Vec::new(),
            imports: Vec::new(),
            exports: None,
        }
    }
}

/// Module name to the sorted, deduplicated set of bindings imported from it.
pub type BindingMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub modules: Vec<ModuleSnapshot>,
}

impl Manifest {
    pub fn find(&self, id: &str) -> Option<&ModuleSnapshot> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ModuleSnapshot> {
        self.modules.iter_mut().find(|m| m.id == id)
    }

    /// Derives the binding map from every import in the manifest.
    pub fn binding_map(&self) -> BindingMap {
        let mut map = BindingMap::new();
        for module in &self.modules {
            for import in &module.imports {
                let entry = map.entry(import.id.clone()).or_default();
                entry.extend(import.bindings.iter().cloned());
            }
        }
        for bindings in map.values_mut() {
            bindings.sort();
            bindings.dedup();
        }
        map
    }

    /// Loads a manifest from disk. A missing file is an empty manifest.
    pub async fn load(path: &Path) -> Result<Manifest, PackError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Manifest::default());
            }
            Err(err) => {
                return Err(PackError::Manifest {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                });
            }
        };
        serde_json::from_slice(&raw).map_err(|err| PackError::Manifest {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    /// Writes the manifest as JSON, creating parent directories as needed.
    pub async fn save(&self, path: &Path) -> Result<(), PackError> {
        let io_err = |err: std::io::Error| PackError::Manifest {
            path: path.display().to_string(),
            reason: err.to_string(),
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let raw = serde_json::to_vec(self).map_err(|err| PackError::Manifest {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        tokio::fs::write(path, raw).await.map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(id: &str, bindings: &[&str]) -> ModuleImport {
        ModuleImport {
            id: id.into(),
            name: id.into(),
            bindings: bindings.iter().map(|b| b.to_string()).collect(),
        }
    }

    #[test]
    fn binding_map_unions_sorts_and_dedups() {
        let manifest = Manifest {
            modules: vec![
                ModuleSnapshot {
                    imports: vec![import("lib@1.0.0", &["b", "a"])],
                    ..ModuleSnapshot::new("app")
                },
                ModuleSnapshot {
                    imports: vec![import("lib@1.0.0", &["a", "c"])],
                    ..ModuleSnapshot::new("other")
                },
            ],
        };
        let map = manifest.binding_map();
        assert_eq!(map["lib@1.0.0"], vec!["a", "b", "c"]);
    }

    #[test]
    fn side_effect_and_namespace_bindings_survive_derivation() {
        let manifest = Manifest {
            modules: vec![ModuleSnapshot {
                imports: vec![import("lib@1.0.0", &["*", ""])],
                ..ModuleSnapshot::new("app")
            }],
        };
        assert_eq!(manifest.binding_map()["lib@1.0.0"], vec!["", "*"]);
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dist").join("meta.json");
        let manifest = Manifest {
            modules: vec![ModuleSnapshot {
                externals: vec!["lib".into()],
                imports: vec![import("lib@1.0.0", &["default"])],
                exports: Some(vec!["main".into()]),
                ..ModuleSnapshot::new("app")
            }],
        };
        manifest.save(&path).await.unwrap();
        assert_eq!(Manifest::load(&path).await.unwrap(), manifest);
    }

    #[tokio::test]
    async fn a_missing_manifest_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::load(&dir.path().join("meta.json")).await.unwrap();
        assert!(manifest.modules.is_empty());
    }

    #[tokio::test]
    async fn a_corrupt_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        tokio::fs::write(&path, b"not json").await.unwrap();
        assert!(matches!(
            Manifest::load(&path).await,
            Err(PackError::Manifest { .. })
        ));
    }
}
