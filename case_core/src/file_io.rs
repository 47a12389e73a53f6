//! # File I/O Module
//!
//! Writes finished documents to disk atomically: the bytes go to a `.tmp`
//! sibling first, are synced, then renamed over the final name, so a crash
//! never leaves a truncated PDF behind.
//!
//! ## Example
//!
//! ```rust,no_run
//! use case_core::file_io::save_pdf;
//! use std::path::Path;
//!
//! let path = save_pdf(b"%PDF-1.7 ...", Path::new("out"), "my_album_jewel_case.pdf").unwrap();
//! println!("wrote {}", path.display());
//! ```

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{CaseError, CaseResult};

/// Write `bytes` to `dir/filename` atomically.
///
/// `dir` is created if it does not exist. `filename` must be a bare file
/// name (no separators), as produced by
/// [`export_filename`](crate::export::export_filename).
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(CaseError::InvalidInput)` - `filename` is empty or contains a path
/// * `Err(CaseError::FileError)` - Any I/O failure
pub fn save_pdf(bytes: &[u8], dir: &Path, filename: &str) -> CaseResult<PathBuf> {
    let bare = Path::new(filename)
        .file_name()
        .is_some_and(|name| name == OsStr::new(filename));
    if filename.is_empty() || !bare {
        return Err(CaseError::invalid_input("filename", filename, "Must be a bare file name"));
    }

    fs::create_dir_all(dir)
        .map_err(|e| CaseError::file_error("create directory", dir.display().to_string(), e.to_string()))?;

    let path = dir.join(filename);
    let tmp_path = dir.join(format!("{}.tmp", filename));

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CaseError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(bytes).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CaseError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CaseError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;
    drop(tmp_file);

    fs::rename(&tmp_path, &path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CaseError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = bytes.len(), "pdf saved");
    Ok(path)
}
