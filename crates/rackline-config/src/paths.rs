//! Platform-specific paths for persisted chain orders.
//!
//! Every chain keeps its order in its own file inside the user config
//! directory, named after [`ChainKind::key`]:
//!
//! - Linux: `~/.config/rackline/source_outputs.toml`
//! - macOS: `~/Library/Application Support/rackline/source_outputs.toml`
//! - Windows: `%APPDATA%\rackline\source_outputs.toml`

use rackline_core::ChainKind;
use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "rackline";

/// Extension of order files.
const ORDER_EXT: &str = "toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// File name of a chain's order file (e.g. `source_outputs.toml`).
pub fn order_file_name(kind: ChainKind) -> String {
    format!("{}.{ORDER_EXT}", kind.key())
}

/// Order file of `kind` inside `dir`.
pub fn order_file_path_in(dir: &Path, kind: ChainKind) -> PathBuf {
    dir.join(order_file_name(kind))
}

/// Order file of `kind` inside the user config directory.
pub fn order_file_path(kind: ChainKind) -> PathBuf {
    order_file_path_in(&user_config_dir(), kind)
}

/// Chains that have an order file in `dir`.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn chains_with_order_files(dir: &Path) -> Vec<ChainKind> {
    ChainKind::all()
        .iter()
        .copied()
        .filter(|&kind| order_file_path_in(dir, kind).is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn user_config_dir_is_namespaced() {
        let dir = user_config_dir();
        assert!(dir.to_string_lossy().contains("rackline"));
    }

    #[test]
    fn order_file_names() {
        assert_eq!(order_file_name(ChainKind::SourceOutputs), "source_outputs.toml");
        assert_eq!(order_file_name(ChainKind::SinkInputs), "sink_inputs.toml");
    }

    #[test]
    fn order_file_path_uses_config_dir() {
        let path = order_file_path(ChainKind::SinkInputs);
        assert!(path.starts_with(user_config_dir()));
        assert!(path.ends_with("sink_inputs.toml"));
    }

    #[test]
    fn chains_with_order_files_lists_existing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(chains_with_order_files(temp_dir.path()).is_empty());

        fs::write(
            order_file_path_in(temp_dir.path(), ChainKind::SinkInputs),
            "plugins = []",
        )
        .unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        assert_eq!(
            chains_with_order_files(temp_dir.path()),
            vec![ChainKind::SinkInputs]
        );
    }

    #[test]
    fn chains_with_order_files_nonexistent_dir() {
        let chains = chains_with_order_files(Path::new("/nonexistent/path/12345"));
        assert!(chains.is_empty());
    }
}
