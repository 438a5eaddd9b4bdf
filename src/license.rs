//! # License Module
//!
//! This module turns a raw license reference into a [`License`] that the
//! matcher and the prepender work with.
//!
//! A reference can be:
//! - an `http://` or `https://` URL whose response body is the license text
//! - a delimited regular expression such as `/Copyright \d{4}/`
//! - a path to a file holding the license text
//! - the license text itself
//!
//! ## Example
//!
//! ```rust,no_run
//! use licheck::license::LicenseResolver;
//!
//! # async fn run() -> Result<(), licheck::error::LicenseError> {
//! let resolver = LicenseResolver::new(false);
//! let license = resolver.resolve("LICENSE_HEADER.txt").await?;
//! println!("Resolved license from {}", license.origin);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::LicenseError;
use crate::pattern::compile_delimited;

/// User agent sent with license downloads.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

static URL_SHAPE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(?i)https?://[^\s/?#]+[^\s]*$").expect("url shape regex must compile"));

/// Where a license came from. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseOrigin {
  /// The reference itself was the license text
  Text(String),
  /// The license text was read from a file
  File(PathBuf),
  /// The reference was a delimited regular expression
  Pattern(String),
  /// The license text was downloaded
  Url(String),
}

impl fmt::Display for LicenseOrigin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LicenseOrigin::Text(_) => write!(f, "inline text"),
      LicenseOrigin::File(path) => write!(f, "file {}", path.display()),
      LicenseOrigin::Pattern(pattern) => write!(f, "pattern {pattern}"),
      LicenseOrigin::Url(url) => write!(f, "{url}"),
    }
  }
}

/// The compiled form of a license, ready for matching.
#[derive(Debug, Clone)]
pub enum LicenseValue {
  /// Literal license text, split into lines
  Lines(Vec<String>),
  /// A regular expression; can detect a license but never be written
  Pattern(Regex),
}

/// A resolved license.
#[derive(Debug, Clone)]
pub struct License {
  /// The reference this license was resolved from
  pub origin: LicenseOrigin,
  /// What files are matched against
  pub value: LicenseValue,
}

impl License {
  /// Builds a literal license from text, splitting it on `\n`.
  ///
  /// When `normalize_newlines` is set, every escaped `\n` (a backslash followed
  /// by `n`) becomes a real newline first.
  pub fn from_text(origin: LicenseOrigin, text: &str, normalize_newlines: bool) -> Self {
    let text = if normalize_newlines {
      text.replace("\\n", "\n")
    } else {
      text.to_string()
    };

    Self {
      origin,
      value: LicenseValue::Lines(text.split('\n').map(str::to_string).collect()),
    }
  }

  /// Builds a literal license from inline text.
  pub fn literal(text: &str) -> Self {
    Self::from_text(LicenseOrigin::Text(text.to_string()), text, false)
  }

  /// Builds a detection-only license from a regular expression.
  pub fn pattern(regex: Regex) -> Self {
    Self {
      origin: LicenseOrigin::Pattern(regex.as_str().to_string()),
      value: LicenseValue::Pattern(regex),
    }
  }

  /// Returns the license lines, or `None` for a pattern license.
  pub fn lines(&self) -> Option<&[String]> {
    match &self.value {
      LicenseValue::Lines(lines) => Some(lines),
      LicenseValue::Pattern(_) => None,
    }
  }

  /// Whether this license is a regular expression.
  pub const fn is_pattern(&self) -> bool {
    matches!(self.value, LicenseValue::Pattern(_))
  }

  /// The license lines rejoined with `\n`, or `None` for a pattern license.
  pub fn text(&self) -> Option<String> {
    self.lines().map(|lines| lines.join("\n"))
  }
}

/// Returns `true` if `value` should be downloaded rather than read or compiled.
pub fn is_url(value: &str) -> bool {
  URL_SHAPE.is_match(value)
}

/// Resolves license references into [`License`] values.
///
/// Resolution tries, in order: URL download, delimited regular expression,
/// file read, and finally the reference itself as literal text.
pub struct LicenseResolver {
  /// Whether to turn escaped `\n` sequences into newlines
  normalize_newlines: bool,
  /// HTTP client for URL references, built on the first download
  client: OnceCell<reqwest::Client>,
}

impl LicenseResolver {
  /// Creates a resolver that builds its own HTTP client on the first
  /// download and reuses it afterwards.
  pub fn new(normalize_newlines: bool) -> Self {
    Self {
      normalize_newlines,
      client: OnceCell::new(),
    }
  }

  /// Creates a resolver that downloads with the given client.
  pub fn with_client(normalize_newlines: bool, client: reqwest::Client) -> Self {
    Self {
      normalize_newlines,
      client: OnceCell::new_with(Some(client)),
    }
  }

  /// Resolves `reference` into a license.
  ///
  /// # Errors
  ///
  /// - [`LicenseError::LicenseFetchFailed`] if the reference is a URL and the
  ///   download fails or returns a non-success status. A URL never falls back
  ///   to literal text.
  /// - [`LicenseError::InvalidPattern`] if the reference has the delimited
  ///   regex shape but does not compile.
  ///
  /// A reference that cannot be read as a file is not an error; it becomes the
  /// license text.
  pub async fn resolve(&self, reference: &str) -> Result<License, LicenseError> {
    if is_url(reference) {
      debug!("Downloading license from {}", reference);
      let text = self.fetch(reference).await?;
      return Ok(License::from_text(
        LicenseOrigin::Url(reference.to_string()),
        &text,
        self.normalize_newlines,
      ));
    }

    if let Some(regex) = compile_delimited(reference)? {
      debug!("Using license pattern {}", reference);
      return Ok(License {
        origin: LicenseOrigin::Pattern(reference.to_string()),
        value: LicenseValue::Pattern(regex),
      });
    }

    match tokio::fs::read_to_string(reference).await {
      Ok(text) => {
        debug!("Read license from file {}", reference);
        Ok(License::from_text(
          LicenseOrigin::File(PathBuf::from(reference)),
          &text,
          self.normalize_newlines,
        ))
      }
      Err(e) => {
        debug!("License reference is not a readable file ({}), using it as text", e);
        Ok(License::from_text(
          LicenseOrigin::Text(reference.to_string()),
          reference,
          self.normalize_newlines,
        ))
      }
    }
  }

  async fn fetch(&self, url: &str) -> Result<String, LicenseError> {
    let client = self
      .client
      .get_or_try_init(|| async { reqwest::Client::builder().user_agent(USER_AGENT).build() })
      .await
      .map_err(|e| fetch_failed(url, e.to_string()))?;

    let response = client
      .get(url)
      .send()
      .await
      .map_err(|e| fetch_failed(url, e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      return Err(fetch_failed(url, format!("HTTP {status}")));
    }

    response.text().await.map_err(|e| fetch_failed(url, e.to_string()))
  }
}

fn fetch_failed(url: &str, reason: String) -> LicenseError {
  LicenseError::LicenseFetchFailed {
    url: url.to_string(),
    reason,
  }
}
