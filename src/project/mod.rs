// SPDX-License-Identifier: MIT

//! Project model: the package graph and the persisted build manifest.

pub mod manifest;
pub mod pkg;

pub use manifest::{BindingMap, Manifest, ModuleImport, ModuleSnapshot};
pub use pkg::{PkgGraph, PkgIdx, PkgNode};

/// File name of the persisted manifest inside the dist directory.
pub const META_JSON: &str = "meta.json";

/// Separator between a vendor package's name and its version in module
/// names. Scoped package names start with it, so splits never happen at
/// position zero.
pub const VERSIONED_VENDOR_SEP: char = '@';

/// Joins package names into the public name of a nested dependency.
pub const PACKAGE_NAME_SEP: &str = "$mosaic";

/// Binding that stands for a namespace import of the whole module.
pub const NAMESPACE_BINDING: &str = "*";

/// Binding recorded for pure side-effect imports, keeping the imported
/// module alive in the manifest.
pub const SIDE_EFFECT_BINDING: &str = "";
