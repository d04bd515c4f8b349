//! Writes CSV exports to the configured directory.

use recs_core::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes `contents` to `directory/file_name`, creating the directory if
/// needed, and returns the full path.
pub fn write_export(directory: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    if !directory.as_os_str().is_empty() && !directory.exists() {
        fs::create_dir_all(directory)?;
    }

    let path = directory.join(file_name);
    fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "CSV export written");
    Ok(path)
}
