// Pre-generation cleanup of an output tree. Stale generated files go away,
// files whose first non-blank line carries the retention marker stay, and
// subdirectories that end up with nothing but dot-entries are removed on the
// way back up. Running it twice in a row changes nothing the second time.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::error::{ModelgenError, Result};

lazy_static! {
    /// The conventional marker: a first line starting with `// KEEP`.
    pub static ref DEFAULT_RETENTION: Regex = Regex::new(r"^\s*//\s+KEEP").unwrap();
}

/// Counts of what a reconcile pass did, mostly for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub kept: usize,
    pub deleted_files: usize,
    pub deleted_dirs: usize,
}

/// Clean `root` of generated files with the given extension (no leading dot),
/// preserving any file whose first non-blank line matches `retention`.
///
/// A missing root is a no-op, not an error. Dot-prefixed entries are left
/// alone entirely. File contents are never modified, only deletions happen.
pub fn reconcile(root: &Path, extension: &str, retention: &Regex) -> Result<ReconcileStats> {
    let mut stats = ReconcileStats::default();
    if !root.is_dir() {
        debug!(root = %root.display(), "output root absent, nothing to reconcile");
        return Ok(stats);
    }
    clean_dir(root, extension, retention, &mut stats)?;
    info!(
        kept = stats.kept,
        deleted_files = stats.deleted_files,
        deleted_dirs = stats.deleted_dirs,
        "reconciled {}",
        root.display()
    );
    Ok(stats)
}

fn clean_dir(
    dir: &Path,
    extension: &str,
    retention: &Regex,
    stats: &mut ReconcileStats,
) -> Result<()> {
    // sorted traversal keeps logs and failure points deterministic
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| ModelgenError::file_system(dir, e))?
        .collect::<std::io::Result<_>>()
        .map_err(|e| ModelgenError::file_system(dir, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| ModelgenError::file_system(&path, e))?;
        if file_type.is_dir() {
            clean_dir(&path, extension, retention, stats)?;
            if count_visible(&path)? == 0 {
                fs::remove_dir(&path).map_err(|e| ModelgenError::file_system(&path, e))?;
                stats.deleted_dirs += 1;
                debug!(dir = %path.display(), "removed emptied directory");
            }
        } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            if retained(&path, retention)? {
                stats.kept += 1;
                info!(file = %path.display(), "KEEP marker found, retained");
            } else {
                fs::remove_file(&path).map_err(|e| ModelgenError::file_system(&path, e))?;
                stats.deleted_files += 1;
                debug!(file = %path.display(), "deleted stale generated file");
            }
        }
    }
    Ok(())
}

/// Does the first non-blank line of the file match the retention pattern?
fn retained(path: &Path, retention: &Regex) -> Result<bool> {
    let file = fs::File::open(path).map_err(|e| ModelgenError::file_system(path, e))?;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| ModelgenError::file_system(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        return Ok(retention.is_match(&line));
    }
    Ok(false)
}

fn count_visible(dir: &Path) -> Result<usize> {
    let mut visible = 0;
    for entry in fs::read_dir(dir).map_err(|e| ModelgenError::file_system(dir, e))? {
        let entry = entry.map_err(|e| ModelgenError::file_system(dir, e))?;
        if !entry.file_name().to_string_lossy().starts_with('.') {
            visible += 1;
        }
    }
    Ok(visible)
}
