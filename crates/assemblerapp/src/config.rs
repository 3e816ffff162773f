//! # Configuration
//!
//! Assembler configuration is a [`confique`] struct, resolved in priority order:
//!
//! 1. **Environment variables**: `ASSEMBLER_INCLUDE_INDENTATION`, `ASSEMBLER_INDENTATION_SIZE`, etc.
//! 2. **Config file**: `assembler.toml` in the OS config directory (via `directories`).
//! 3. **Compiled Defaults**: Built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `include_indentation` | `false` | Expand multi-valued containers across lines |
//! | `indentation_size` | `4` | Spaces per nesting level when indenting |
//! | `show_hidden` | `false` | List hidden attributes when inspecting |
//! | `show_non_keyable` | `true` | List non-keyable attributes when inspecting |
//! | `connected_only` | `false` | List only connected attributes when inspecting |
//!
//! Indentation settings are handed to the encoder per call; nothing here is global.

use crate::error::{AssemblerError, Result};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "assembler.toml";

/// Configuration for the assembler, stored in `assembler.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Expand containers holding more than one value across lines.
    #[config(default = false, env = "ASSEMBLER_INCLUDE_INDENTATION")]
    pub include_indentation: bool,

    /// Spaces per nesting level.
    #[config(default = 4, env = "ASSEMBLER_INDENTATION_SIZE")]
    pub indentation_size: usize,

    #[config(default = false, env = "ASSEMBLER_SHOW_HIDDEN")]
    pub show_hidden: bool,

    #[config(default = true, env = "ASSEMBLER_SHOW_NON_KEYABLE")]
    pub show_non_keyable: bool,

    #[config(default = false, env = "ASSEMBLER_CONNECTED_ONLY")]
    pub connected_only: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            include_indentation: false,
            indentation_size: 4,
            show_hidden: false,
            show_non_keyable: true,
            connected_only: false,
        }
    }
}

impl AssemblerConfig {
    /// Load from the environment and the user's config file, if there is one.
    pub fn load() -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = default_config_path() {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| AssemblerError::Config(e.to_string()))
    }

    /// Load from the environment and a specific file. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::builder()
            .env()
            .file(path)
            .load()
            .map_err(|e| AssemblerError::Config(e.to_string()))
    }
}

/// `assembler.toml` in the OS config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "assembler", "assembler")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AssemblerConfig::default();
        assert!(!config.include_indentation);
        assert_eq!(config.indentation_size, 4);
        assert!(!config.show_hidden);
        assert!(config.show_non_keyable);
        assert!(!config.connected_only);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "include_indentation = true\nindentation_size = 2\n").unwrap();

        let config = AssemblerConfig::load_from(&path).unwrap();
        assert!(config.include_indentation);
        assert_eq!(config.indentation_size, 2);
        assert!(config.show_non_keyable);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = AssemblerConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.indentation_size, 4);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "indentation_size = \"wide\"\n").unwrap();
        assert!(matches!(
            AssemblerConfig::load_from(&path),
            Err(AssemblerError::Config(_))
        ));
    }
}
