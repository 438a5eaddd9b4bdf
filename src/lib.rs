//! # licheck
//!
//! A tool that checks source trees for a required license header and can
//! prepend it to files that are missing it.
//!
//! The license can be given as literal text, a path to a file, an `http(s)`
//! URL, or a `/regex/flags` pattern. Files that contain only some of the
//! license lines are reported as partially licensed, with the share of lines
//! found.
//!
//! ## Features
//!
//! * Recursive, lazy traversal with include and exclude patterns for file and
//!   directory names (`node_modules` is skipped by default)
//! * Concurrent per-file checking with an optional concurrency bound
//! * Three prepend policies: never, when fully missing, or when partially
//!   missing too
//! * JSON and CSV reports
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use licheck::license::LicenseResolver;
//! use licheck::prepend::PrependPolicy;
//! use licheck::scan::{ScanRequest, run_scan};
//! use licheck::scanner::ScanFilters;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let license = LicenseResolver::new(false).resolve("LICENSE_HEADER.txt").await?;
//!     let filters = ScanFilters::from_patterns(r"/\.(ts|js)$/i", None, None, None)?;
//!
//!     let request = ScanRequest::new("src", filters, license).with_prepend(PrependPolicy::IfFullyMissing);
//!     let summary = run_scan(request, |report| println!("{}", report.path.display())).await?;
//!
//!     println!("{} files without the license", summary.not_found);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! * [`license`] - Resolving a license reference
//! * [`matcher`] - Matching file content against a license
//! * [`prepend`] - Writing the license into files
//! * [`scanner`] - Filtered directory traversal
//! * [`scan`] - Running a whole scan concurrently
//! * [`report`] - Per-file results, summaries and report files

pub mod config;
pub mod error;
pub mod license;
pub mod logging;
pub mod matcher;
pub mod output;
pub mod pattern;
pub mod prepend;
pub mod report;
pub mod scan;
pub mod scanner;
