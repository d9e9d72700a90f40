// SPDX-License-Identifier: MIT

//! YAML configuration file loading.

use std::path::Path;

use crate::config::UserConfig;
use crate::errors::PackError;

/// Loads a [`UserConfig`] from a YAML file.
pub fn load_config(path: &Path) -> Result<UserConfig, PackError> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        PackError::configuration(format!("cannot read config '{}': {err}", path.display()))
    })?;
    serde_yaml::from_str(&raw).map_err(|err| {
        PackError::configuration(format!("invalid config '{}': {err}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetaSource;
    use std::io::Write;

    #[test]
    fn loads_a_yaml_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
dist: out
base: /cdn/
extensions: [ts, tsx]
apps:
  - name: shell
    packages: [shell]
meta: fresh
"#
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dist.as_deref(), Some("out"));
        assert_eq!(config.extensions, vec!["ts", "tsx"]);
        assert_eq!(config.apps[0].name, "shell");
        assert_eq!(config.meta, MetaSource::Fresh);
    }

    #[test]
    fn invalid_yaml_is_a_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "apps: 12").unwrap();
        assert!(matches!(
            load_config(file.path()),
            Err(PackError::Configuration { .. })
        ));
    }
}
