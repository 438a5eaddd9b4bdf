//! # Pattern Module
//!
//! Compiles user-supplied strings into regular expressions.
//!
//! A string is treated as a regular expression when it has the delimited shape
//! `/pattern/flags`, for example `/Copyright \d{4}/i`. Anything else is left to
//! the caller to interpret as literal text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::LicenseError;

/// Matches the `/pattern/flags` shape. The pattern group is greedy, so the last
/// slash in the string separates the flags.
static DELIMITED_SHAPE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^/(.+)/([gmixsuUAjD]*)$").expect("delimited shape regex must compile"));

/// Compiles a delimited `/pattern/flags` string.
///
/// Returns `Ok(None)` when `value` does not have the delimited shape. Flags `i`,
/// `m`, `s`, `x` and `U` map onto the regex engine; `g` and `u` are accepted
/// and ignored. Any other flag, or a repeated one, is an error.
///
/// # Errors
///
/// [`LicenseError::InvalidPattern`] if the shape matches but the flags or the
/// pattern body are invalid.
pub fn compile_delimited(value: &str) -> Result<Option<Regex>, LicenseError> {
  let Some(caps) = DELIMITED_SHAPE.captures(value) else {
    return Ok(None);
  };

  let body = &caps[1];
  let flags = caps.get(2).map_or("", |m| m.as_str());

  let mut builder = RegexBuilder::new(body);
  let mut seen = HashSet::new();
  for flag in flags.chars() {
    if !seen.insert(flag) {
      return Err(invalid(value, format!("flag '{flag}' is repeated")));
    }
    match flag {
      'i' => {
        builder.case_insensitive(true);
      }
      'm' => {
        builder.multi_line(true);
      }
      's' => {
        builder.dot_matches_new_line(true);
      }
      'x' => {
        builder.ignore_whitespace(true);
      }
      'U' => {
        builder.swap_greed(true);
      }
      // Matching is always global and Unicode-aware
      'g' | 'u' => {}
      other => return Err(invalid(value, format!("flag '{other}' is not supported"))),
    }
  }

  builder
    .build()
    .map(Some)
    .map_err(|e| invalid(value, e.to_string()))
}

/// Compiles a traversal filter.
///
/// Filters accept the delimited shape as well as a bare regular expression, so
/// both `/\.rs$/` and `\.rs$` select Rust files.
///
/// # Errors
///
/// [`LicenseError::InvalidPattern`] if the value cannot be compiled either way.
pub fn compile_filter(value: &str) -> Result<Regex, LicenseError> {
  if let Some(regex) = compile_delimited(value)? {
    return Ok(regex);
  }

  Regex::new(value).map_err(|e| invalid(value, e.to_string()))
}

fn invalid(pattern: &str, reason: String) -> LicenseError {
  LicenseError::InvalidPattern {
    pattern: pattern.to_string(),
    reason,
  }
}
