//! # Scan Module
//!
//! Drives a full scan: traverses the tree, checks every discovered file
//! concurrently, optionally prepends the license, and aggregates the results.
//!
//! Traversal runs on a blocking worker and streams paths through a channel.
//! Each path becomes its own task, so files are read, matched and written
//! without waiting for one another. Results are reported in completion order
//! and the summary is only produced once every task has finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::LicenseError;
use crate::license::License;
use crate::matcher::match_license;
use crate::prepend::{PrependPolicy, maybe_prepend};
use crate::report::{FileReport, ScanSummary};
use crate::scanner::{DirectoryScanner, ScanFilters};

/// Paths buffered between the traversal worker and the scan loop.
const PATH_CHANNEL_CAPACITY: usize = 256;

/// Everything needed for one scan.
pub struct ScanRequest {
  /// Directory to scan
  pub root: PathBuf,
  /// File and directory name filters
  pub filters: ScanFilters,
  /// License to look for, shared read-only by every file task
  pub license: Arc<License>,
  /// When to write the license into files
  pub prepend: PrependPolicy,
  /// Whether to log each completed file
  pub log: bool,
  /// Upper bound on files processed at once; `None` is unbounded
  pub max_concurrency: Option<usize>,
}

impl ScanRequest {
  /// Creates a check-only request with no concurrency bound.
  pub fn new(root: impl Into<PathBuf>, filters: ScanFilters, license: License) -> Self {
    Self {
      root: root.into(),
      filters,
      license: Arc::new(license),
      prepend: PrependPolicy::Never,
      log: false,
      max_concurrency: None,
    }
  }

  /// Sets the prepend policy.
  #[must_use]
  pub const fn with_prepend(mut self, prepend: PrependPolicy) -> Self {
    self.prepend = prepend;
    self
  }

  /// Bounds the number of files processed at once.
  #[must_use]
  pub const fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
    self.max_concurrency = max_concurrency;
    self
  }

  /// Enables per-file logging.
  #[must_use]
  pub const fn with_log(mut self, log: bool) -> Self {
    self.log = log;
    self
  }

  /// Checks preconditions that would otherwise fail on every file.
  ///
  /// # Errors
  ///
  /// [`LicenseError::InvalidPrependTarget`] if the policy can write and the
  /// license is a regular expression.
  pub fn validate(&self) -> Result<(), LicenseError> {
    if self.prepend.writes() && self.license.is_pattern() {
      return Err(LicenseError::InvalidPrependTarget);
    }
    Ok(())
  }
}

/// Runs a scan, calling `on_file` for every completed entry.
///
/// `on_file` runs on the calling task in completion order, never concurrently
/// with itself. Directories that could not be read are reported through it as
/// well, with no match result.
///
/// # Errors
///
/// Returns an error only when the request itself is invalid; see
/// [`ScanRequest::validate`]. Per-file and per-directory failures are reported
/// through `on_file` and counted in [`ScanSummary::errors`].
pub async fn run_scan<F>(request: ScanRequest, mut on_file: F) -> Result<ScanSummary, LicenseError>
where
  F: FnMut(&FileReport),
{
  request.validate()?;

  let ScanRequest {
    root,
    filters,
    license,
    prepend,
    log,
    max_concurrency,
  } = request;

  debug!("Checking licenses in: {} (license from {})", root.display(), license.origin);
  let start = Instant::now();

  let (tx, mut rx) = mpsc::channel(PATH_CHANNEL_CAPACITY);
  let scanner = DirectoryScanner::new(filters);
  let traversal = tokio::task::spawn_blocking(move || {
    for item in scanner.scan(&root) {
      if tx.blocking_send(item).is_err() {
        break;
      }
    }
  });

  let limiter = max_concurrency.map(|n| Arc::new(Semaphore::new(n.max(1))));
  let mut tasks = JoinSet::new();
  let mut summary = ScanSummary::default();
  let mut traversal_done = false;

  loop {
    tokio::select! {
      item = rx.recv(), if !traversal_done => match item {
        Some(Ok(path)) => {
          tasks.spawn(check_file_task(path, Arc::clone(&license), prepend, limiter.clone()));
        }
        Some(Err(e)) => {
          warn!("{}", e);
          let path = match &e {
            LicenseError::TraversalFailed { path, .. } => path.clone(),
            _ => PathBuf::new(),
          };
          let report = FileReport::failed(path, &e);
          summary.record(&report);
          on_file(&report);
        }
        None => traversal_done = true,
      },
      Some(joined) = tasks.join_next() => match joined {
        Ok(report) => {
          if log {
            debug!("Checked {}: {:?}", report.path.display(), report.result);
          }
          summary.record(&report);
          on_file(&report);
        }
        Err(e) => {
          warn!("File task failed: {}", e);
          summary.errors += 1;
        }
      },
      else => break,
    }
  }

  if let Err(e) = traversal.await {
    warn!("Directory traversal worker failed: {}", e);
  }

  summary.finish(start.elapsed());
  debug!(
    "Checked {} files in {}ms",
    summary.total_files(),
    summary.elapsed_ms
  );

  Ok(summary)
}

async fn check_file_task(
  path: PathBuf,
  license: Arc<License>,
  policy: PrependPolicy,
  limiter: Option<Arc<Semaphore>>,
) -> FileReport {
  // Held until the file is done; a closed semaphore just means no bound
  let _permit = match limiter {
    Some(semaphore) => semaphore.acquire_owned().await.ok(),
    None => None,
  };

  check_file(&path, &license, policy).await
}

/// Reads, matches and (depending on `policy`) prepends a single file.
///
/// Failures are recorded on the returned report rather than returned.
pub async fn check_file(path: &Path, license: &License, policy: PrependPolicy) -> FileReport {
  let content = match tokio::fs::read_to_string(path).await {
    Ok(content) => content,
    Err(source) => {
      let error = LicenseError::FileReadFailed {
        path: path.to_path_buf(),
        source,
      };
      warn!("{}", error);
      return FileReport::failed(path.to_path_buf(), &error);
    }
  };

  let mut result = match_license(&content, license);

  match maybe_prepend(path, &content, license, &result, policy).await {
    Ok(wrote) => {
      result.prepended = wrote;
      FileReport::checked(path.to_path_buf(), result)
    }
    Err(error) => {
      warn!("{}", error);
      FileReport::write_failed(path.to_path_buf(), result, &error)
    }
  }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;
  use crate::matcher::LicenseStatus;

  #[tokio::test]
  async fn test_check_file_reports_read_failure() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("missing.ts");

    let report = check_file(&missing, &License::literal("Copyright X"), PrependPolicy::Never).await;
    assert!(report.result.is_none());
    assert!(report.error.unwrap().contains("Failed to read file"));
  }

  #[tokio::test]
  async fn test_check_file_prepends() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("a.ts");
    fs::write(&path, "code").unwrap();

    let report = check_file(&path, &License::literal("Copyright X"), PrependPolicy::IfFullyMissing).await;
    let result = report.result.unwrap();
    assert_eq!(result.status, LicenseStatus::NotFound);
    assert!(result.prepended);
    assert_eq!(fs::read_to_string(&path).unwrap(), "Copyright X\ncode");
  }

  #[test]
  fn test_validate_rejects_pattern_prepend() {
    let filters = ScanFilters::from_patterns(".+", None, None, None).unwrap();
    let license = License::pattern(regex::Regex::new("Copyright").unwrap());

    let request = ScanRequest::new("/tmp", filters.clone(), license.clone());
    assert!(request.validate().is_ok());

    let request = ScanRequest::new("/tmp", filters, license).with_prepend(PrependPolicy::IfPartialOrFullyMissing);
    assert!(matches!(request.validate(), Err(LicenseError::InvalidPrependTarget)));
  }

  #[tokio::test]
  async fn test_run_scan_counts_by_status() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("found.ts"), "Copyright X\nMIT\ncode").unwrap();
    fs::write(root.join("partial.ts"), "Copyright X\ncode").unwrap();
    fs::write(root.join("missing.ts"), "code").unwrap();
    fs::write(root.join("ignored.rs"), "code").unwrap();

    let filters = ScanFilters::from_patterns(r"\.ts$", None, None, None).unwrap();
    let request = ScanRequest::new(root, filters, License::literal("Copyright X\nMIT"));

    let mut seen = Vec::new();
    let summary = run_scan(request, |report| seen.push(report.path.clone())).await.unwrap();

    assert_eq!(summary.found, 1);
    assert_eq!(summary.partially_found, 1);
    assert_eq!(summary.not_found, 1);
    assert_eq!(summary.total_files(), 3);
    assert_eq!(summary.errors, 0);
    assert_eq!(seen.len(), 3);
  }

  #[tokio::test]
  async fn test_run_scan_with_bounded_concurrency() {
    let temp_dir = tempdir().unwrap();
    for i in 0..20 {
      fs::write(temp_dir.path().join(format!("file{i}.ts")), "code").unwrap();
    }

    let filters = ScanFilters::from_patterns(r"\.ts$", None, None, None).unwrap();
    let request = ScanRequest::new(temp_dir.path(), filters, License::literal("Copyright X"))
      .with_prepend(PrependPolicy::IfFullyMissing)
      .with_max_concurrency(Some(2));

    let summary = run_scan(request, |_| {}).await.unwrap();
    assert_eq!(summary.not_found, 20);
    assert_eq!(summary.prepended, 20);
  }
}
