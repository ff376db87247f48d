//! Utility functions for GradePal.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{GradepalError, Result};

/// Maximum file size that can be read into memory (10 MB).
///
/// A course collection is a few kilobytes; anything near this limit is not
/// a GradePal data file.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a file into a string with size limit protection.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read (doesn't exist, permission denied, etc.)
/// * The file exceeds `MAX_FILE_SIZE`
/// * The content is not valid UTF-8 (a `Serde` error, not a `Storage` one)
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| GradepalError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(GradepalError::storage(
            path,
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    let bytes = fs::read(path).map_err(|e| GradepalError::storage(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        GradepalError::serde(format!("{} is not valid UTF-8: {}", path.display(), e))
    })
}
