//! `weekrep.toml` configuration
//!
//! ```toml
//! data = "weekrep.json"
//! company = "Acme Trading"
//! logo = "assets/logo.png"
//! page_size = 100
//! ```
//!
//! Every key is optional. Relative paths are resolved against the directory
//! holding the config file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "weekrep.toml";

pub const DEFAULT_DATA_FILE: &str = "weekrep.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON data file with the directory and reports
    pub data: PathBuf,
    /// Company name for export titles
    pub company: String,
    /// Logo image for exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    /// Rows per statistics page
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: PathBuf::from(DEFAULT_DATA_FILE),
            company: String::new(),
            logo: None,
            page_size: 100,
        }
    }
}

impl Config {
    /// Load `path`, or `weekrep.toml` from the working directory if present.
    ///
    /// An explicit path must exist; the default one may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("config file not found: {}", path.display());
            }
            debug!("no {DEFAULT_CONFIG_FILE}, using defaults");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))?;
        debug!(path = %path.display(), "config loaded");

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        if self.data.is_relative() {
            self.data = base.join(&self.data);
        }
        if let Some(logo) = self.logo.take() {
            self.logo = Some(if logo.is_relative() { base.join(logo) } else { logo });
        }
        self
    }
}
