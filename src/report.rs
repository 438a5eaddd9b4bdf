//! # Report Module
//!
//! Per-file results, the aggregate scan summary, and report files in JSON or
//! CSV.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::error::LicenseError;
use crate::matcher::{LicenseStatus, MatchResult};

/// The result of processing one discovered path.
///
/// `result` is absent when the file could not be read or, for directory
/// entries, when a subtree could not be enumerated. `error` is set for any
/// per-entry failure, including a failed prepend on a file that was matched.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
  /// Path to the file or directory
  #[serde(serialize_with = "serialize_path")]
  pub path: PathBuf,
  /// Match outcome, if the file could be read
  pub result: Option<MatchResult>,
  /// Description of the failure, if any
  pub error: Option<String>,
}

impl FileReport {
  /// A file that was read and matched.
  pub const fn checked(path: PathBuf, result: MatchResult) -> Self {
    Self {
      path,
      result: Some(result),
      error: None,
    }
  }

  /// A file that was matched but whose prepend failed.
  pub fn write_failed(path: PathBuf, result: MatchResult, error: &LicenseError) -> Self {
    Self {
      path,
      result: Some(result),
      error: Some(error.to_string()),
    }
  }

  /// An entry that could not be processed at all.
  pub fn failed(path: PathBuf, error: &LicenseError) -> Self {
    Self {
      path,
      result: None,
      error: Some(error.to_string()),
    }
  }

  /// Whether this file ends the scan with the full license present.
  pub fn is_satisfied(&self) -> bool {
    self.error.is_none()
      && self
        .result
        .is_some_and(|r| r.status == LicenseStatus::Found || r.prepended)
  }
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
  S: serde::Serializer,
{
  serializer.serialize_str(&path.to_string_lossy())
}

/// Aggregate counts for one scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
  /// Files containing the full license
  pub found: usize,
  /// Files containing some license lines
  pub partially_found: usize,
  /// Files containing no license line
  pub not_found: usize,
  /// Files the license was written into
  pub prepended: usize,
  /// Files and directories that failed
  pub errors: usize,
  /// Wall-clock time from the start of traversal to the last completed file
  #[serde(skip_serializing)]
  pub elapsed: Duration,
  /// Elapsed time in milliseconds for serialization
  pub elapsed_ms: u64,
}

impl ScanSummary {
  /// Adds one report to the counters.
  pub fn record(&mut self, report: &FileReport) {
    if let Some(result) = &report.result {
      match result.status {
        LicenseStatus::Found => self.found += 1,
        LicenseStatus::PartiallyFound => self.partially_found += 1,
        LicenseStatus::NotFound => self.not_found += 1,
      }
      if result.prepended {
        self.prepended += 1;
      }
    }

    if report.error.is_some() {
      self.errors += 1;
    }
  }

  /// Sets the elapsed time.
  pub fn finish(&mut self, elapsed: Duration) {
    self.elapsed = elapsed;
    self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
  }

  /// Number of files that were read and matched.
  pub const fn total_files(&self) -> usize {
    self.found + self.partially_found + self.not_found
  }
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
  /// JSON format for machine readability
  Json,
  /// CSV format for spreadsheet compatibility
  Csv,
}

impl std::fmt::Display for ReportFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReportFormat::Json => write!(f, "JSON"),
      ReportFormat::Csv => write!(f, "CSV"),
    }
  }
}

/// Report Generator for creating license reports
pub struct ReportGenerator<'a> {
  /// Format of the report to generate
  format: ReportFormat,
  /// Path where the report will be saved
  output_path: &'a Path,
}

impl<'a> ReportGenerator<'a> {
  /// Create a new report generator
  ///
  /// # Parameters
  ///
  /// * `format` - The format to use for the report
  /// * `output_path` - The path where the report will be saved
  pub const fn new(format: ReportFormat, output_path: &'a Path) -> Self {
    Self { format, output_path }
  }

  /// Generate a report from the scan's file reports and summary.
  ///
  /// # Returns
  ///
  /// `Ok(())` if the report was generated successfully, or an error if the
  /// report couldn't be generated or written to disk.
  pub fn generate(&self, files: &[FileReport], summary: &ScanSummary) -> Result<()> {
    let content = self.render(files, summary)?;

    fs::write(self.output_path, content)
      .with_context(|| format!("Failed to write report to {}", self.output_path.display()))
  }

  /// Render the report content without writing it.
  pub fn render(&self, files: &[FileReport], summary: &ScanSummary) -> Result<String> {
    match self.format {
      ReportFormat::Json => Self::generate_json(files, summary),
      ReportFormat::Csv => Ok(Self::generate_csv(files, summary)),
    }
  }

  fn generate_json(files: &[FileReport], summary: &ScanSummary) -> Result<String> {
    #[derive(Serialize)]
    struct JsonReport<'r> {
      files: &'r [FileReport],
      summary: &'r ScanSummary,
      total_files: usize,
      generated_at: String,
    }

    let report = JsonReport {
      files,
      summary,
      total_files: summary.total_files(),
      generated_at: Local::now().to_rfc3339(),
    };

    serde_json::to_string_pretty(&report).with_context(|| "Failed to serialize JSON report")
  }

  fn generate_csv(files: &[FileReport], summary: &ScanSummary) -> String {
    let mut csv = String::new();

    csv.push_str("file_path,status,ratio,prepended,error\n");

    for file in files {
      let path = file.path.to_string_lossy().replace(',', "%2C"); // Escape commas in path
      let (status, ratio, prepended) = match &file.result {
        Some(result) => (
          status_label(result.status),
          format!("{:.4}", result.ratio),
          result.prepended.to_string(),
        ),
        None => ("error", String::new(), String::new()),
      };
      let error = file.error.as_deref().unwrap_or_default().replace(',', "%2C");

      csv.push_str(&format!("{},{},{},{},{}\n", path, status, ratio, prepended, error));
    }

    csv.push_str("\n# Summary\n");
    csv.push_str(&format!("Total files checked,{}\n", summary.total_files()));
    csv.push_str(&format!("Found,{}\n", summary.found));
    csv.push_str(&format!("Partially found,{}\n", summary.partially_found));
    csv.push_str(&format!("Not found,{}\n", summary.not_found));
    csv.push_str(&format!("Prepended,{}\n", summary.prepended));
    csv.push_str(&format!("Errors,{}\n", summary.errors));
    csv.push_str(&format!("Elapsed (ms),{}\n", summary.elapsed_ms));
    csv.push_str(&format!("Generated on,{}\n", Local::now().format("%Y-%m-%d %H:%M:%S")));

    csv
  }
}

const fn status_label(status: LicenseStatus) -> &'static str {
  match status {
    LicenseStatus::Found => "found",
    LicenseStatus::PartiallyFound => "partially_found",
    LicenseStatus::NotFound => "not_found",
  }
}
