//! World configuration, loadable from YAML or JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a world configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0:?}")]
    UnsupportedFormat(String),
    #[error("invalid {name}: {value} (must be finite and positive)")]
    InvalidDimension { name: &'static str, value: f32 },
}

/// Construction parameters for a [`World`](crate::World).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 480.0,
        }
    }
}

impl WorldConfig {
    /// Load a config file, choosing the parser by extension (`yaml`, `yml`, `json`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            _ => return Err(ConfigError::UnsupportedFormat(ext)),
        };
        tracing::debug!(path = %path.display(), ?config, "loaded world config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Both dimensions must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDimension { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.width, 800.0);
        assert_eq!(config.height, 480.0);
    }

    #[test]
    fn parse_yaml() {
        let config = WorldConfig::from_yaml_str("width: 20.0\nheight: 12.5\n").unwrap();
        assert_eq!(config, WorldConfig { width: 20.0, height: 12.5 });
    }

    #[test]
    fn parse_json() {
        let config = WorldConfig::from_json_str(r#"{"width": 4, "height": 3}"#).unwrap();
        assert_eq!(config.width, 4.0);
        assert_eq!(config.height, 3.0);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = WorldConfig::from_json_str(r#"{"width": 4, "height": 3, "depth": 1}"#);
        assert!(matches!(err, Err(ConfigError::Json(_))));
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let err = WorldConfig::from_yaml_str("width: 0\nheight: 10\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDimension { name: "width", .. }
        ));

        let err = WorldConfig::from_json_str(r#"{"width": 5, "height": -1}"#).unwrap_err();
        assert!(err.to_string().contains("height"));
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("world.yaml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(f, "width: 64\nheight: 32").unwrap();
        let config = WorldConfig::load(&yaml_path).unwrap();
        assert_eq!(config, WorldConfig { width: 64.0, height: 32.0 });

        let json_path = dir.path().join("world.json");
        std::fs::write(&json_path, r#"{"width": 10, "height": 10}"#).unwrap();
        assert_eq!(WorldConfig::load(&json_path).unwrap().width, 10.0);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.toml");
        std::fs::write(&path, "width = 1").unwrap();
        assert!(matches!(
            WorldConfig::load(&path),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = WorldConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
