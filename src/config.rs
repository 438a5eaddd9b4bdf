//! # Configuration Module
//!
//! This module provides configuration support for licheck, so a project can
//! pin its license reference and filters instead of repeating them on every
//! invocation.
//!
//! Configuration can be specified in a `.licheck.toml` file in the scanned
//! directory, via the `--config` flag, or via the `LICHECK_CONFIG` environment
//! variable. Command-line values always take precedence.
//!
//! ```toml
//! license = "LICENSE_HEADER.txt"
//! normalize-newlines = false
//! prepend = "missing"
//! jobs = 64
//!
//! [filters]
//! files = '\.(ts|js)$'
//! exclude-files = '\.d\.ts$'
//! exclude-dirs = '^(node_modules|dist)$'
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::pattern::compile_filter;
use crate::prepend::PrependPolicy;
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".licheck.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "LICHECK_CONFIG";

/// Traversal filter patterns. Each may be delimited (`/\.ts$/i`) or a bare
/// regular expression.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilterConfig {
  /// File names to check
  pub files: Option<String>,
  /// File names to skip
  pub exclude_files: Option<String>,
  /// Directory names to enter
  pub dirs: Option<String>,
  /// Directory names to skip
  pub exclude_dirs: Option<String>,
}

/// Main configuration struct for licheck.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  /// License reference: a path, literal text, a delimited regex, or a URL
  pub license: Option<String>,
  /// Whether to turn escaped `\n` sequences into newlines
  pub normalize_newlines: Option<bool>,
  /// When to write the license into files
  pub prepend: Option<PrependPolicy>,
  /// Upper bound on files processed at once
  pub jobs: Option<usize>,
  /// Traversal filters
  #[serde(default)]
  pub filters: FilterConfig,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A configuration value is invalid.
  #[error("Invalid value for '{key}': {message}")]
  Invalid { key: String, message: String },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read, parsed
  /// or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - `jobs` is at least 1
  /// - every filter pattern compiles
  fn validate(&self) -> Result<(), ConfigError> {
    if self.jobs == Some(0) {
      return Err(ConfigError::Invalid {
        key: "jobs".to_string(),
        message: "must be at least 1".to_string(),
      });
    }

    let filters = [
      ("filters.files", &self.filters.files),
      ("filters.exclude-files", &self.filters.exclude_files),
      ("filters.dirs", &self.filters.dirs),
      ("filters.exclude-dirs", &self.filters.exclude_dirs),
    ];
    for (key, pattern) in filters {
      if let Some(pattern) = pattern
        && let Err(e) = compile_filter(pattern)
      {
        return Err(ConfigError::Invalid {
          key: key.to_string(),
          message: e.to_string(),
        });
      }
    }

    Ok(())
  }
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `LICHECK_CONFIG` environment variable
/// 3. `.licheck.toml` in the scanned root
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let root_config = root.join(DEFAULT_CONFIG_FILENAME);
  if root_config.exists() {
    verbose_log!("Using config: {}", root_config.display());
    return Some(root_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `root` - The scanned directory
/// * `no_config` - If true, skip config file discovery
///
/// # Returns
///
/// The loaded configuration, or `None` if no config file is found.
pub fn load_config(explicit_path: Option<&Path>, root: &Path, no_config: bool) -> Result<Option<Config>> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(None);
  }

  match discover_config_path(explicit_path, root) {
    Some(path) => {
      let config = Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))?;
      Ok(Some(config))
    }
    None => Ok(None),
  }
}
