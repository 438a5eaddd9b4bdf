//! # Scanner Module
//!
//! Recursive, lazy directory traversal with independent include/exclude
//! filters for file names and directory names.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

use crate::error::LicenseError;
use crate::pattern::compile_filter;

/// Directory include pattern used when none is given.
pub const DEFAULT_DIR_INCLUDE: &str = ".+";

/// Directory exclude pattern used when no directory pattern at all is given.
/// Skips the conventional dependency directory.
pub const DEFAULT_DIR_EXCLUDE: &str = "^node_modules";

/// Name filters applied during traversal.
///
/// Filters match against a single path component (the file or directory name),
/// never the full path.
#[derive(Debug, Clone)]
pub struct ScanFilters {
  /// Files must match this to be yielded
  pub file_include: Regex,
  /// Files matching this are never yielded
  pub file_exclude: Option<Regex>,
  /// Directories must match this to be entered
  pub dir_include: Regex,
  /// Directories matching this are never entered
  pub dir_exclude: Option<Regex>,
}

impl ScanFilters {
  /// Compiles filters from raw strings.
  ///
  /// Each pattern may be delimited (`/\.ts$/i`) or a bare regular expression.
  /// When neither directory pattern is given, directories are filtered by
  /// [`DEFAULT_DIR_INCLUDE`] and [`DEFAULT_DIR_EXCLUDE`]. Supplying either one
  /// drops the default exclude; a missing include is still
  /// [`DEFAULT_DIR_INCLUDE`].
  ///
  /// # Errors
  ///
  /// [`LicenseError::InvalidPattern`] if any pattern fails to compile.
  pub fn from_patterns(
    file_include: &str,
    file_exclude: Option<&str>,
    dir_include: Option<&str>,
    dir_exclude: Option<&str>,
  ) -> Result<Self, LicenseError> {
    let dir_exclude = match (dir_include, dir_exclude) {
      (None, None) => Some(DEFAULT_DIR_EXCLUDE),
      (_, exclude) => exclude,
    };

    Ok(Self {
      file_include: compile_filter(file_include)?,
      file_exclude: file_exclude.map(compile_filter).transpose()?,
      dir_include: compile_filter(dir_include.unwrap_or(DEFAULT_DIR_INCLUDE))?,
      dir_exclude: dir_exclude.map(compile_filter).transpose()?,
    })
  }

  /// Whether a file with this name should be yielded.
  pub fn accepts_file(&self, name: &str) -> bool {
    self.file_include.is_match(name) && !self.file_exclude.as_ref().is_some_and(|re| re.is_match(name))
  }

  /// Whether a directory with this name should be entered.
  pub fn accepts_dir(&self, name: &str) -> bool {
    self.dir_include.is_match(name) && !self.dir_exclude.as_ref().is_some_and(|re| re.is_match(name))
  }

  fn accepts_entry(&self, entry: &DirEntry) -> bool {
    // The root is always entered, whatever its name
    if entry.depth() == 0 {
      return true;
    }

    let name = entry.file_name().to_string_lossy();
    let file_type = entry.file_type();
    if file_type.is_dir() {
      self.accepts_dir(&name)
    } else if file_type.is_file() {
      self.accepts_file(&name)
    } else {
      trace!("Skipping: {} (not a regular file or directory)", entry.path().display());
      false
    }
  }
}

/// Enumerates files under a directory tree.
///
/// Traversal is depth-first and lazy. Entries within a directory come in the
/// order the filesystem reports them. Symbolic links are skipped.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
  filters: Arc<ScanFilters>,
}

impl DirectoryScanner {
  pub fn new(filters: ScanFilters) -> Self {
    Self {
      filters: Arc::new(filters),
    }
  }

  /// Starts a fresh traversal of `root`.
  ///
  /// Yields the absolute path of every accepted file. A directory that cannot
  /// be read yields one [`LicenseError::TraversalFailed`] item and traversal
  /// continues with its siblings.
  pub fn scan(&self, root: &Path) -> ScanIter {
    let root = absolutize_path(root).unwrap_or_else(|_| root.to_path_buf());
    let filters = Arc::clone(&self.filters);
    let predicate: EntryPredicate = Box::new(move |entry: &DirEntry| filters.accepts_entry(entry));

    ScanIter {
      inner: WalkDir::new(root).follow_links(false).into_iter().filter_entry(predicate),
    }
  }
}

type EntryPredicate = Box<dyn FnMut(&DirEntry) -> bool + Send>;

/// Iterator returned by [`DirectoryScanner::scan`].
pub struct ScanIter {
  inner: walkdir::FilterEntry<walkdir::IntoIter, EntryPredicate>,
}

impl Iterator for ScanIter {
  type Item = Result<PathBuf, LicenseError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      match self.inner.next()? {
        Ok(entry) => {
          if entry.depth() > 0 && entry.file_type().is_file() {
            return Some(Ok(entry.into_path()));
          }
        }
        Err(e) => return Some(Err(traversal_failed(&e))),
      }
    }
  }
}

fn traversal_failed(error: &walkdir::Error) -> LicenseError {
  let reason = error
    .io_error()
    .map_or_else(|| error.to_string(), ToString::to_string);

  LicenseError::TraversalFailed {
    path: error.path().map(Path::to_path_buf).unwrap_or_default(),
    reason,
  }
}

/// Converts a potentially relative path to an absolute path.
///
/// # Parameters
///
/// * `path` - The path to absolutize
///
/// # Returns
///
/// The absolute path.
pub fn absolutize_path(path: &Path) -> std::io::Result<PathBuf> {
  if path.is_absolute() {
    Ok(path.to_path_buf())
  } else {
    Ok(std::env::current_dir()?.join(path))
  }
}
