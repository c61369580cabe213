//! On-disk format of a chain order.

use rackline_core::OrderRecord;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::error::ConfigError;

/// Contents of an order file.
///
/// # TOML Format
///
/// ```toml
/// plugins = ["limiter", "compressor", "filter", "equalizer", "reverb"]
/// ```
///
/// Unknown tokens, duplicates, missing plugins and the `"applications"`
/// sentinel all fail to parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderFile {
    /// Plugin order, first to last.
    pub plugins: OrderRecord,
}

impl OrderFile {
    /// Wrap an order.
    pub fn new(plugins: OrderRecord) -> Self {
        Self { plugins }
    }

    /// Load an order file.
    ///
    /// Returns `Ok(None)` when the file does not exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(Some(Self::from_toml(&content)?))
    }

    /// Parse an order file from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Atomically replace the file at `path` with this order.
    ///
    /// The content is written to a temporary file in the same directory and
    /// renamed over the target, so readers see either the old or the new
    /// order and never a partial write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
        }

        let content = self.to_toml()?;
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| ConfigError::write_file(path, e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| ConfigError::write_file(path, e))?;
        tmp.persist(path)
            .map_err(|e| ConfigError::persist(path, e.error))?;
        Ok(())
    }
}
