#![allow(dead_code)]

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Creates a temporary directory populated with `files`, given as
/// `(relative path, content)` pairs. Parent directories are created as needed.
pub fn create_tree(files: &[(&str, &str)]) -> Result<TempDir> {
  let temp_dir = tempfile::tempdir()?;
  for (relative, content) in files {
    write_file(temp_dir.path(), relative, content)?;
  }
  Ok(temp_dir)
}

/// Writes `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> Result<()> {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Reads `root/relative` as a string.
pub fn read_file(root: &Path, relative: &str) -> Result<String> {
  let path = root.join(relative);
  fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}
