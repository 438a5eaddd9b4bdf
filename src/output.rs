//! # Output Module
//!
//! This module centralizes all user-facing output for licheck. It provides
//! consistent formatting, colors, and symbols for terminal output.
//!
//! ## Design Goals
//!
//! - **Informative**: files needing attention are listed as they complete
//! - **Progressive**: files that already carry the license only show with `-v`
//! - **Scriptable**: with `-q`, stdout holds only the paths that still lack
//!   the full license

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::license::LicenseOrigin;
use crate::logging::{is_quiet, is_verbose};
use crate::matcher::LicenseStatus;
use crate::report::{FileReport, ScanSummary};

/// Symbols used in output
pub mod symbols {
  /// Has license / license written
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Missing license / failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Some license lines present
  pub const PARTIAL: &str = "~";
}

/// Print the initial "Checking licenses in ..." message.
pub fn print_start_message(root: &Path, origin: &LicenseOrigin) {
  if is_quiet() {
    return;
  }

  println!("Checking licenses in {} (license from {})...", root.display(), origin);
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print one completed file.
///
/// Errors always go to stderr. In quiet mode, every file that does not end the
/// scan with the full license is printed as a bare path on stdout. Otherwise
/// files needing attention are shown with their status, and files that already
/// carry the license are only shown in verbose mode.
pub fn print_file_report(report: &FileReport, root: Option<&Path>) {
  let display_path = make_relative_path(&report.path, root);

  if let Some(error) = &report.error {
    eprintln!(
      "  {} {}: {}",
      symbols::FAILURE.if_supports_color(Stream::Stderr, |s| s.red()),
      display_path,
      error
    );
  }

  if is_quiet() {
    if report.result.is_some() && !report.is_satisfied() {
      println!("{}", display_path);
    }
    return;
  }

  let Some(result) = &report.result else {
    return;
  };

  let line = if result.prepended {
    format!(
      "  {} {} ({}, license prepended)",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      display_path,
      describe_status(result.status, result.ratio)
    )
  } else {
    match result.status {
      LicenseStatus::Found => {
        if !is_verbose() {
          return;
        }
        format!(
          "  {} {}",
          symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
          display_path
        )
      }
      LicenseStatus::PartiallyFound => format!(
        "  {} {} ({})",
        symbols::PARTIAL.if_supports_color(Stream::Stdout, |s| s.yellow()),
        display_path,
        describe_status(result.status, result.ratio)
      ),
      LicenseStatus::NotFound => format!(
        "  {} {} ({})",
        symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()),
        display_path,
        describe_status(result.status, result.ratio)
      ),
    }
  };

  println!("{}", line);
}

/// Human-readable status, with the match ratio for partial matches.
fn describe_status(status: LicenseStatus, ratio: f64) -> String {
  match status {
    LicenseStatus::Found => "license found".to_string(),
    LicenseStatus::PartiallyFound => format!("license partially found, {:.2}%", ratio * 100.0),
    LicenseStatus::NotFound => "license not found".to_string(),
  }
}

/// Print the scan summary.
///
/// Format: "Checked N files: F found, P partial, M missing"
/// followed by the prepend and error counts when non-zero, and the elapsed
/// time.
pub fn print_summary(summary: &ScanSummary) {
  if is_quiet() {
    return;
  }

  let found_str = summary.found.if_supports_color(Stream::Stdout, |s| s.cyan());
  let partial_str = if summary.partially_found > 0 {
    summary
      .partially_found
      .if_supports_color(Stream::Stdout, |s| s.yellow())
      .to_string()
  } else {
    summary.partially_found.to_string()
  };
  let missing_str = if summary.not_found > 0 {
    summary
      .not_found
      .if_supports_color(Stream::Stdout, |s| s.red())
      .to_string()
  } else {
    summary.not_found.to_string()
  };

  let total = summary.total_files();
  let mut summary_line = format!(
    "Checked {} {}: {} found, {} partial, {} missing",
    total,
    if total == 1 { "file" } else { "files" },
    found_str,
    partial_str,
    missing_str
  );

  if summary.prepended > 0 {
    summary_line.push_str(&format!(", {} prepended", summary.prepended));
  }
  if summary.errors > 0 {
    summary_line.push_str(&format!(
      ", {} {}",
      summary.errors.if_supports_color(Stream::Stdout, |s| s.red()),
      if summary.errors == 1 { "error" } else { "errors" }
    ));
  }
  summary_line.push_str(&format!(" in {}ms", summary.elapsed_ms));

  println!("{}", summary_line);
}

/// Print the success message when every file carries the full license.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }

  println!(
    "{} All files have the license.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

/// Print a fatal error as `Error > message` on stderr.
pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    "Error >".if_supports_color(Stream::Stderr, |s| s.red()),
    message
  );
}

/// Make a path relative to the scanned root for display.
fn make_relative_path(path: &Path, root: Option<&Path>) -> String {
  if let Some(root) = root {
    path
      .strip_prefix(root)
      .map(|p| p.to_string_lossy().to_string())
      .unwrap_or_else(|_| path.to_string_lossy().to_string())
  } else {
    path.to_string_lossy().to_string()
  }
}
