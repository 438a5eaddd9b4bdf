//! # Matcher Module
//!
//! Decides whether file content contains a license, and how much of it.
//!
//! Matching is purely textual. A literal license is found when its full text
//! appears verbatim; otherwise each line is looked up on its own and the share
//! of lines present becomes the match ratio.

use serde::Serialize;

use crate::license::{License, LicenseValue};

/// How much of the license a file contains.
///
/// Ordered so that `NotFound < PartiallyFound < Found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
  /// None of the license lines appear in the file
  NotFound,
  /// Some license lines appear, but not the full text
  PartiallyFound,
  /// The full license text appears verbatim
  Found,
}

impl std::fmt::Display for LicenseStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      LicenseStatus::NotFound => write!(f, "not found"),
      LicenseStatus::PartiallyFound => write!(f, "partially found"),
      LicenseStatus::Found => write!(f, "found"),
    }
  }
}

/// The outcome of checking one file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
  /// Match status
  pub status: LicenseStatus,
  /// Fraction of license lines present, 1 for `Found` and 0 for `NotFound`
  pub ratio: f64,
  /// Whether the license was written into the file during this scan
  pub prepended: bool,
}

impl MatchResult {
  pub const fn found() -> Self {
    Self {
      status: LicenseStatus::Found,
      ratio: 1.0,
      prepended: false,
    }
  }

  pub const fn not_found() -> Self {
    Self {
      status: LicenseStatus::NotFound,
      ratio: 0.0,
      prepended: false,
    }
  }

  pub const fn partially_found(ratio: f64) -> Self {
    Self {
      status: LicenseStatus::PartiallyFound,
      ratio,
      prepended: false,
    }
  }
}

/// Checks `content` against `license`.
///
/// - A pattern license is `Found` if it matches anywhere, else `NotFound`.
/// - A literal license is `Found` if its lines, joined with `\n`, appear as one
///   contiguous block. Otherwise every non-blank license line is searched for
///   independently; any hits give `PartiallyFound` with `hits / lines`.
///
/// Blank lines are not scored since they would match any file. A license with
/// no non-blank lines is always `Found`.
pub fn match_license(content: &str, license: &License) -> MatchResult {
  let lines = match &license.value {
    LicenseValue::Pattern(regex) => {
      return if regex.is_match(content) {
        MatchResult::found()
      } else {
        MatchResult::not_found()
      };
    }
    LicenseValue::Lines(lines) => lines,
  };

  if content.contains(&lines.join("\n")) {
    return MatchResult::found();
  }

  let scored: Vec<&String> = lines.iter().filter(|line| !line.trim().is_empty()).collect();
  if scored.is_empty() {
    return MatchResult::found();
  }

  let hits = scored.iter().filter(|line| content.contains(line.as_str())).count();
  if hits == 0 {
    return MatchResult::not_found();
  }

  MatchResult::partially_found(hits as f64 / scored.len() as f64)
}
