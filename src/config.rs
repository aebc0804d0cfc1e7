//! Configuration management for blackpipe.
//!
//! This module provides the [`Config`] struct, the flat record the invocation
//! pipeline reads. Configuration can be loaded from:
//! - TOML files (`blackpipe.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered: the user's home directory first (global
//! layer), then every directory from the filesystem root down to the buffer's
//! directory (project layers). Project layers cannot change `command`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::encoding;

/// Config file names to search for
const CONFIG_FILE_NAMES: &[&str] = &["blackpipe.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_command() -> String {
    "black".to_string()
}
fn default_encoding() -> String {
    "utf-8".to_string()
}
fn default_reformatted_marker() -> String {
    "reformatted".to_string()
}
fn default_unchanged_marker() -> String {
    "unchanged".to_string()
}

/// Substrings Black prints on stderr after a successful run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusMarkers {
    #[serde(default = "default_reformatted_marker")]
    pub reformatted: String,

    #[serde(default = "default_unchanged_marker")]
    pub unchanged: String,
}

impl Default for StatusMarkers {
    fn default() -> Self {
        StatusMarkers {
            reformatted: default_reformatted_marker(),
            unchanged: default_unchanged_marker(),
        }
    }
}

/// Main configuration struct for blackpipe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Formatter executable (default: `black`)
    #[serde(default = "default_command")]
    pub command: String,

    /// Target line length, passed as `-l`
    #[serde(default)]
    pub line_length: Option<u32>,

    /// Pass `--fast` (skip Black's AST safety checks)
    #[serde(default)]
    pub fast: bool,

    /// Pass `--skip-string-normalization`
    #[serde(default)]
    pub skip_string_normalization: bool,

    /// Regex passed as `--include`
    #[serde(default)]
    pub include: Option<String>,

    /// Regex passed as `--exclude`
    #[serde(default)]
    pub exclude: Option<String>,

    /// Pass `--py36`
    #[serde(default)]
    pub py36: bool,

    /// Encoding used when neither the host nor the buffer declares one
    #[serde(default = "default_encoding")]
    pub default_encoding: String,

    /// Emit debug logging
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub markers: StatusMarkers,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub command: Option<String>,
    pub line_length: Option<u32>,
    pub fast: Option<bool>,
    pub skip_string_normalization: Option<bool>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub py36: Option<bool>,
    pub default_encoding: Option<String>,
    pub debug: Option<bool>,
    #[serde(default)]
    pub markers: PartialMarkers,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialMarkers {
    pub reformatted: Option<String>,
    pub unchanged: Option<String>,
}

/// Which layer a config file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Home directory or an explicit `--config` file
    Global,
    /// A file found next to (or above) the buffer
    Project,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            command: default_command(),
            line_length: None,
            fast: false,
            skip_string_normalization: false,
            include: None,
            exclude: None,
            py36: false,
            default_encoding: default_encoding(),
            debug: false,
            markers: StatusMarkers::default(),
        }
    }
}

impl Config {
    /// Validate configuration values
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.command.trim().is_empty() {
            return Some("command must not be empty".to_string());
        }
        if self.line_length == Some(0) {
            return Some("line_length must be at least 1".to_string());
        }
        if self.markers.reformatted.is_empty() || self.markers.unchanged.is_empty() {
            return Some("status markers must not be empty".to_string());
        }
        if self.markers.reformatted == self.markers.unchanged {
            return Some("status markers must differ".to_string());
        }
        if encoding::lookup(&self.default_encoding).is_err() {
            return Some(format!(
                "default_encoding {} is not a known encoding",
                self.default_encoding
            ));
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial, Layer::Global);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig, layer: Layer) {
        if let Some(v) = &partial.command {
            if layer == Layer::Global {
                self.command.clone_from(v);
            } else {
                warn!(command = %v, "ignoring `command` set by a project config file");
            }
        }
        if let Some(v) = partial.line_length {
            self.line_length = Some(v);
        }
        if let Some(v) = partial.fast {
            self.fast = v;
        }
        if let Some(v) = partial.skip_string_normalization {
            self.skip_string_normalization = v;
        }
        if let Some(v) = &partial.include {
            self.include = Some(v.clone());
        }
        if let Some(v) = &partial.exclude {
            self.exclude = Some(v.clone());
        }
        if let Some(v) = partial.py36 {
            self.py36 = v;
        }
        if let Some(v) = &partial.default_encoding {
            self.default_encoding.clone_from(v);
        }
        if let Some(v) = partial.debug {
            self.debug = v;
        }
        if let Some(v) = &partial.markers.reformatted {
            self.markers.reformatted.clone_from(v);
        }
        if let Some(v) = &partial.markers.unchanged {
            self.markers.unchanged.clone_from(v);
        }
    }

    /// Discover config files for a given path
    ///
    /// Returns the home directory config (if any) tagged [`Layer::Global`], then
    /// configs from the root down to the path's directory tagged
    /// [`Layer::Project`], least specific first.
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<(PathBuf, Layer)> {
        let mut config_files: Vec<(PathBuf, Layer)> = Vec::new();

        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push((home_config, Layer::Global));
                }
            }
        }

        // Relative paths have an empty parent; walk from the absolute form
        let start_path =
            std::path::absolute(start_path).unwrap_or_else(|_| start_path.to_path_buf());
        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root first, so closer files override
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file()
                        && !config_files.iter().any(|(p, _)| *p == config_path)
                    {
                        config_files.push((config_path, Layer::Project));
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for (path, layer) in &Self::discover_config_files(start_path) {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial, *layer),
                    Err(e) => warn!("failed to parse {}: {e}", path.display()),
                },
                Err(e) => warn!("failed to read {}: {e}", path.display()),
            }
        }
        config
    }
}
