// SPDX-License-Identifier: MIT

//! Build configuration.
//!
//! Embedders supply a [`UserConfig`] through the `get-config` hook (or load
//! one from a YAML file with [`load_config`]); [`UserConfig::normalize`]
//! fills defaults and produces the immutable [`Config`] the rest of the
//! build reads.

pub mod loader;

pub use loader::load_config;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::PackError;
use crate::project::META_JSON;

/// Where the previous build manifest comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaSource {
    /// Read `meta.json` from the local dist directory; missing file means a
    /// cold build.
    #[default]
    Local,
    /// Ignore any previous manifest and rebuild everything.
    Fresh,
}

/// An application entry exposed by the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    /// Local packages the app activates. Empty means all of them.
    #[serde(default)]
    pub packages: Vec<String>,
}

/// Configuration as written by the embedder. Optional fields default during
/// normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub dist: Option<String>,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub apps: Vec<AppConfig>,
    #[serde(default)]
    pub meta: MetaSource,
}

/// Normalized configuration, immutable for the rest of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cwd: PathBuf,
    pub dist: String,
    pub assets: String,
    pub base: String,
    pub extensions: Vec<String>,
    pub apps: Vec<AppConfig>,
    pub meta: MetaSource,
}

impl UserConfig {
    pub fn normalize(self) -> Result<Config, PackError> {
        let cwd = match self.cwd {
            Some(cwd) => cwd,
            None => std::env::current_dir().map_err(|err| {
                PackError::configuration(format!("cannot resolve working directory: {err}"))
            })?,
        };
        Ok(Config {
            cwd,
            dist: self.dist.unwrap_or_else(|| "dist".to_string()),
            assets: self.assets.unwrap_or_else(|| "assets".to_string()),
            base: self.base.unwrap_or_else(|| "/".to_string()),
            extensions: self.extensions,
            apps: self.apps,
            meta: self.meta,
        })
    }
}

impl Config {
    /// Absolute path of the persisted manifest.
    pub fn meta_path(&self) -> PathBuf {
        self.cwd.join(&self.dist).join(META_JSON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_fills_defaults() {
        let config = UserConfig {
            cwd: Some(PathBuf::from("/work")),
            ..UserConfig::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(config.dist, "dist");
        assert_eq!(config.assets, "assets");
        assert_eq!(config.base, "/");
        assert_eq!(config.meta, MetaSource::Local);
        assert_eq!(config.meta_path(), PathBuf::from("/work/dist/meta.json"));
    }

    #[test]
    fn explicit_values_survive_normalization() {
        let config = UserConfig {
            cwd: Some(PathBuf::from("/work")),
            dist: Some("out".into()),
            base: Some("/cdn/".into()),
            meta: MetaSource::Fresh,
            ..UserConfig::default()
        }
        .normalize()
        .unwrap();
        assert_eq!(config.dist, "out");
        assert_eq!(config.base, "/cdn/");
        assert_eq!(config.meta, MetaSource::Fresh);
    }
}
