//! Error types for order file operations.

use rackline_core::ChainError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing order files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to move a finished temporary file over the target
    #[error("failed to replace '{path}': {source}")]
    Persist {
        /// Target path of the rename.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to watch a directory for changes
    #[error("failed to watch '{path}': {source}")]
    Watch {
        /// Directory that could not be watched.
        path: PathBuf,
        /// Underlying watcher error.
        #[source]
        source: notify::Error,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a persist error.
    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Persist {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create a watch error.
    pub fn watch(path: impl Into<PathBuf>, source: notify::Error) -> Self {
        ConfigError::Watch {
            path: path.into(),
            source,
        }
    }

    /// Whether the error happened on the read side.
    pub fn is_read_error(&self) -> bool {
        matches!(self, ConfigError::ReadFile { .. } | ConfigError::TomlParse(_))
    }
}

/// Read failures make the store unavailable; everything else is a failed write.
impl From<ConfigError> for ChainError {
    fn from(err: ConfigError) -> Self {
        if err.is_read_error() {
            ChainError::store_unavailable(err.to_string())
        } else {
            ChainError::write_failure(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mock")
    }

    #[test]
    fn read_file_factory_produces_correct_variant() {
        let err = ConfigError::read_file("/some/path", mock_io_err());
        assert!(
            matches!(err, ConfigError::ReadFile { ref path, .. } if path == std::path::Path::new("/some/path"))
        );
    }

    #[test]
    fn persist_display() {
        let err = ConfigError::persist("/a/source_outputs.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to replace"), "got: {msg}");
        assert!(msg.contains("source_outputs.toml"), "got: {msg}");
    }

    #[test]
    fn io_variants_expose_source() {
        assert!(ConfigError::read_file("/x", mock_io_err()).source().is_some());
        assert!(ConfigError::write_file("/x", mock_io_err()).source().is_some());
        assert!(ConfigError::persist("/x", mock_io_err()).source().is_some());
        assert!(ConfigError::create_dir("/x", mock_io_err()).source().is_some());
        let watch = ConfigError::watch("/x", notify::Error::generic("mock"));
        assert!(watch.source().is_some());
        assert!(watch.to_string().contains("failed to watch"));
    }

    #[test]
    fn read_errors_map_to_store_unavailable() {
        let chain: ChainError = ConfigError::read_file("/x", mock_io_err()).into();
        assert!(matches!(chain, ChainError::StoreUnavailable { .. }));

        let parse = toml::from_str::<toml::Value>("plugins = [").unwrap_err();
        let chain: ChainError = ConfigError::from(parse).into();
        assert!(matches!(chain, ChainError::StoreUnavailable { .. }));
    }

    #[test]
    fn write_errors_map_to_write_failure() {
        for err in [
            ConfigError::write_file("/x", mock_io_err()),
            ConfigError::persist("/x", mock_io_err()),
            ConfigError::create_dir("/x", mock_io_err()),
        ] {
            let chain: ChainError = err.into();
            assert!(
                matches!(chain, ChainError::PersistenceWriteFailure { .. }),
                "got: {chain:?}"
            );
        }
    }
}
