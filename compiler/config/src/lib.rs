// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! asyncgen Configuration
//!
//! This crate provides configuration management for asyncgen.
//! It handles loading, saving, and managing configuration files that specify:
//! - Code generation parameters (output directory, license, test skeletons)
//! - Client defaults (service URL override, preferred security scheme)
//! - Logging configuration
//!
//! Configuration is stored in TOML format. Every section and field is
//! optional; missing values fall back to the defaults, and command-line flags
//! override whatever the file says.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    /// Failed to parse the TOML configuration file
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize configuration to TOML format
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Could not locate the user's configuration directory
    #[error("Could not find user config directory")]
    ConfigDirUnavailable,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code generation settings
    pub generator: GeneratorConfig,
    /// Generated client defaults
    pub client: ClientDefaults,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Serialization of generated specifications
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecFormat {
    /// `.json`
    Json,
    /// `.yaml`
    #[default]
    Yaml,
}

/// Code generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Where to write generated files
    pub output_dir: PathBuf,
    /// License file prepended to generated Rust sources
    pub license: Option<PathBuf>,
    /// Emit a test skeleton with every client
    pub include_tests: bool,
    /// Format of generated specifications
    pub spec_format: SpecFormat,
}

/// Defaults applied to generated clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientDefaults {
    /// Service URL used instead of the document's first server
    pub server_url: Option<String>,
    /// Security scheme to authenticate with
    pub auth_scheme: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional)
    pub file: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: Config::default_output_dir(),
            license: None,
            include_tests: false,
            spec_format: SpecFormat::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { level: "warn".to_string(), file: None } }
}

impl Config {
    /// Load configuration from a TOML file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load the file at [`Config::default_path`] when it exists, else the defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Ok(path) if path.is_file() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Save this configuration as a pretty-printed TOML file at `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Returns the default config file path:
    /// `{config_dir()}/asyncgen/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir =
            dirs::config_dir().ok_or(ConfigError::ConfigDirUnavailable)?.join("asyncgen");
        Ok(config_dir.join("config.toml"))
    }

    /// Get the default output directory for generated code
    pub fn default_output_dir() -> PathBuf {
        Self::default_output_dir_internal(std::env::current_dir().ok())
    }

    fn default_output_dir_internal(current_dir: Option<PathBuf>) -> PathBuf {
        current_dir.unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_from_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = r#"
            [generator]
            output_dir = "generated"
            license = "LICENSE"
            include_tests = true
            spec_format = "json"

            [client]
            server_url = "ws://localhost:8080"

            [logging]
            level = "debug"
            file = "asyncgen.log"
        "#;
        fs::write(&temp_file, toml_content).expect("Failed to write TOML content");

        let loaded = Config::from_file(&temp_file).expect("Failed to load config");
        assert_eq!(loaded.generator.output_dir, PathBuf::from("generated"));
        assert_eq!(loaded.generator.license, Some(PathBuf::from("LICENSE")));
        assert!(loaded.generator.include_tests);
        assert_eq!(loaded.generator.spec_format, SpecFormat::Json);
        assert_eq!(loaded.client.server_url.as_deref(), Some("ws://localhost:8080"));
        assert_eq!(loaded.client.auth_scheme, None);
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.logging.file, Some(PathBuf::from("asyncgen.log")));

        // Test parse error
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file, "invalid toml content").expect("Failed to write invalid TOML");
        match Config::from_file(&temp_file).expect_err("Expected parse error for invalid TOML") {
            ConfigError::Parse(_) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }

        // Test file not found error
        match Config::from_file("nonexistent_file.toml").expect_err("Expected error") {
            ConfigError::FileRead(_) => {}
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        fs::write(&temp_file, "[client]\nauth_scheme = \"token\"\n").expect("Failed to write");

        let loaded = Config::from_file(&temp_file).expect("Failed to load config");
        assert_eq!(loaded.client.auth_scheme.as_deref(), Some("token"));
        assert_eq!(loaded.logging, LoggingConfig::default());
        assert_eq!(loaded.generator.spec_format, SpecFormat::Yaml);
        assert!(!loaded.generator.include_tests);
    }

    #[test]
    fn test_save_round_trip() {
        let mut config = Config::default();
        config.client.server_url = Some("wss://example.com".to_string());
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        config.save(&temp_file).expect("Failed to save config");

        let contents = fs::read_to_string(&temp_file).expect("Failed to read saved config");
        assert!(contents.contains("[generator]"));
        assert!(contents.contains("spec_format = \"yaml\""));
        assert_eq!(Config::from_file(&temp_file).expect("reload"), config);

        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let missing = temp_dir.path().join("nonexistent").join("config.toml");
        match config.save(&missing).expect_err("Expected write error") {
            ConfigError::FileRead(_) => (),
            other => panic!("Expected FileRead error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_path() {
        let path = Config::default_path().expect("Failed to get default config path");
        let path_str = path.to_str().expect("Path should be valid UTF-8");
        assert!(path_str.ends_with("asyncgen/config.toml"));
    }

    #[test]
    fn test_default_output_dir_internal() {
        let dir = Config::default_output_dir_internal(Some(PathBuf::from("/tmp/current")));
        assert_eq!(dir, PathBuf::from("/tmp/current"));
        assert_eq!(Config::default_output_dir_internal(None), PathBuf::from("."));
    }
}
