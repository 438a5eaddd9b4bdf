//! # Prepend Module
//!
//! Writes the license at the top of files that are missing it, according to a
//! [`PrependPolicy`].

use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::trace;

use crate::error::LicenseError;
use crate::license::License;
use crate::matcher::{LicenseStatus, MatchResult};

/// When to write the license into a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrependPolicy {
  /// Only check, never modify files
  #[default]
  Never,
  /// Prepend when no license line was found
  #[value(name = "missing")]
  #[serde(rename = "missing")]
  IfFullyMissing,
  /// Prepend when the license was not found in full
  #[value(name = "partial")]
  #[serde(rename = "partial")]
  IfPartialOrFullyMissing,
}

impl PrependPolicy {
  /// Whether this policy can ever modify a file.
  pub const fn writes(self) -> bool {
    !matches!(self, PrependPolicy::Never)
  }
}

/// Whether `policy` asks for a write given a file's match `status`.
pub const fn should_prepend(policy: PrependPolicy, status: LicenseStatus) -> bool {
  match policy {
    PrependPolicy::Never => false,
    PrependPolicy::IfFullyMissing => matches!(status, LicenseStatus::NotFound),
    PrependPolicy::IfPartialOrFullyMissing => {
      matches!(status, LicenseStatus::NotFound | LicenseStatus::PartiallyFound)
    }
  }
}

/// Builds the new file content: the license lines joined with `\n`, one `\n`,
/// then the original content unchanged.
pub fn prepended_content(license_text: &str, content: &str) -> String {
  let mut new_content = String::with_capacity(license_text.len() + 1 + content.len());
  new_content.push_str(license_text);
  new_content.push('\n');
  new_content.push_str(content);
  new_content
}

/// Prepends the license to `path` if `policy` asks for it.
///
/// `content` must be the file content `result` was computed from. The file is
/// rewritten in full.
///
/// # Returns
///
/// `true` if the file was written, `false` if the policy did not trigger.
///
/// # Errors
///
/// - [`LicenseError::InvalidPrependTarget`] if `policy` is not
///   [`PrependPolicy::Never`] and the license is a regular expression.
/// - [`LicenseError::FileWriteFailed`] if the file could not be written.
pub async fn maybe_prepend(
  path: &Path,
  content: &str,
  license: &License,
  result: &MatchResult,
  policy: PrependPolicy,
) -> Result<bool, LicenseError> {
  if !policy.writes() {
    return Ok(false);
  }

  let Some(license_text) = license.text() else {
    return Err(LicenseError::InvalidPrependTarget);
  };

  if !should_prepend(policy, result.status) {
    return Ok(false);
  }

  tokio::fs::write(path, prepended_content(&license_text, content))
    .await
    .map_err(|source| LicenseError::FileWriteFailed {
      path: path.to_path_buf(),
      source,
    })?;

  trace!("Prepended license to {}", path.display());
  Ok(true)
}
