//! # Error Module
//!
//! Typed errors produced by the scanning engine.
//!
//! Errors fall into two groups. [`InvalidPattern`], [`LicenseFetchFailed`] and
//! [`InvalidPrependTarget`] invalidate a whole scan and are returned before
//! any directory is read. The remaining variants are scoped to a single file or
//! directory: they are recorded on that entry's report and the scan carries on.
//!
//! [`InvalidPattern`]: LicenseError::InvalidPattern
//! [`LicenseFetchFailed`]: LicenseError::LicenseFetchFailed
//! [`InvalidPrependTarget`]: LicenseError::InvalidPrependTarget

use std::path::PathBuf;

/// Error type for license resolution, matching and scanning.
#[derive(Debug, thiserror::Error)]
pub enum LicenseError {
  /// A regex-shaped string whose pattern or flags could not be compiled.
  #[error("Invalid pattern '{pattern}': {reason}")]
  InvalidPattern { pattern: String, reason: String },

  /// A URL-shaped license reference could not be downloaded.
  #[error("Failed to fetch license from {url}: {reason}")]
  LicenseFetchFailed { url: String, reason: String },

  /// A prepend was requested while the license is a regular expression.
  #[error("A regular expression license can only be used to search for a license, not to prepend one")]
  InvalidPrependTarget,

  /// A discovered file could not be read.
  #[error("Failed to read file {}: {source}", path.display())]
  FileReadFailed { path: PathBuf, source: std::io::Error },

  /// The license could not be written to a file.
  #[error("Failed to write file {}: {source}", path.display())]
  FileWriteFailed { path: PathBuf, source: std::io::Error },

  /// A directory could not be enumerated; its subtree was skipped.
  #[error("Failed to read directory {}: {reason}", path.display())]
  TraversalFailed { path: PathBuf, reason: String },
}
