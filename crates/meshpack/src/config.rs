//! Configuration file support for meshpack.
//!
//! This module provides support for `meshpack.toml` configuration files
//! that persist recipe settings so they don't have to be passed as CLI
//! flags on every invocation.
//!
//! ## Configuration File Location
//!
//! The configuration file is searched for in the following order:
//! 1. Current working directory (`./meshpack.toml`)
//! 2. Parent directories (up to the repository root or filesystem root)
//!
//! ## Example Configuration
//!
//! ```toml
//! [project]
//! name = "meshlink-tiny"
//! library = "meshlink"
//! source_dir = "meshlink"
//!
//! [build]
//! shared = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The default configuration file name.
pub const CONFIG_FILE_NAME: &str = "meshpack.toml";

/// Root configuration structure for `meshpack.toml`.
///
/// CLI flags override config file values when provided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshpackConfig {
    /// Project-level configuration.
    pub project: ProjectConfig,

    /// Build defaults.
    pub build: BuildSection,
}

/// Project-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Human-readable project name (e.g., "meshlink-tiny").
    pub name: Option<String>,

    /// Canonical library name exposed to consumers.
    ///
    /// Defaults to "meshlink" if not specified.
    pub library: Option<String>,

    /// Root of the native source tree containing configure.ac.
    ///
    /// Defaults to the current directory if not specified.
    pub source_dir: Option<PathBuf>,
}

/// Build defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Build shared libraries by default.
    pub shared: bool,

    /// Build directory and install prefix.
    ///
    /// Defaults to the working directory at invocation time, keeping
    /// builds relocatable.
    pub build_dir: Option<PathBuf>,
}

impl MeshpackConfig {
    /// Loads configuration from the specified file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: MeshpackConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Attempts to find and load configuration from the current directory
    /// or any parent directory.
    ///
    /// # Returns
    ///
    /// * `Ok(Some((config, path)))` - Found and loaded configuration with its path
    /// * `Ok(None)` - No configuration file found
    /// * `Err` - If a config file was found but couldn't be parsed
    pub fn discover() -> Result<Option<(Self, PathBuf)>> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&cwd)
    }

    /// Attempts to find and load configuration starting from the specified
    /// directory, walking up until a config file, a `.git` directory, or
    /// the filesystem root is reached.
    pub fn discover_from(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.is_file() {
                let config = Self::load_from_file(&config_path)?;
                return Ok(Some((config, config_path)));
            }

            // Stop at repository root or filesystem root
            if current.join(".git").exists() || !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Saves the configuration to the specified file path.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Returns the exposed library name, defaulting to "meshlink".
    pub fn library_name(&self) -> String {
        self.project
            .library
            .clone()
            .unwrap_or_else(|| "meshlink".to_string())
    }

    /// Returns the source tree root, defaulting to the current directory.
    pub fn source_dir(&self) -> PathBuf {
        self.project
            .source_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Generates a starter configuration file as a formatted TOML string.
    ///
    /// This includes helpful comments explaining each configuration option.
    pub fn generate_starter_toml() -> String {
        r#"# meshpack configuration file
# This file configures the meshlink-tiny build and packaging recipe.
# CLI flags override these settings when provided.

[project]
# Human-readable project name
name = "meshlink-tiny"

# Library name exposed to downstream consumers (default: meshlink)
library = "meshlink"

# Root of the native source tree containing configure.ac (default: .)
# source_dir = "meshlink"

[build]
# Build shared libraries instead of static ones (default: false)
shared = false

# Build directory and install prefix (default: working directory)
# build_dir = "build"
"#
        .to_string()
    }
}
