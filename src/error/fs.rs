//! File system errors

use std::path::Path;

use super::KindlingError;

/// Creates a file read failed error
pub fn read_failed(path: &Path, reason: impl ToString) -> KindlingError {
    KindlingError::FileReadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: &Path, reason: impl ToString) -> KindlingError {
    KindlingError::FileWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a directory unavailable error
pub fn directory_unavailable(what: impl Into<String>) -> KindlingError {
    KindlingError::DirectoryUnavailable { what: what.into() }
}
