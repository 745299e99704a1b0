//! Configuration for the docseal command line
//!
//! Settings come from an optional TOML file. Every section and field is
//! optional; a missing file section falls back to its defaults.

use anyhow::Context;
use docseal_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::picker::PickerConfig;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Signature engine settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// Caller-side document filter
    #[serde(default)]
    pub picker: PickerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docseal_cli::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("docseal.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use docseal_cli::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [engine]
    ///     key_bits = 3072
    ///     default_sink = "contract.sig"
    ///
    ///     [picker]
    ///     allowed_extensions = ["pdf", "txt"]
    /// "#;
    /// let config = Config::from_str(toml)?;
    /// assert_eq!(config.engine.key_bits, 3072);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
