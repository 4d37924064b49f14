//! Resolution and download errors

use super::KindlingError;

/// Creates a resolution failed error
pub fn failed(tool: impl Into<String>, reason: impl Into<String>) -> KindlingError {
    KindlingError::ResolutionFailed {
        tool: tool.into(),
        reason: reason.into(),
    }
}

/// Creates a download failed error
pub fn download_failed(url: impl Into<String>, reason: impl ToString) -> KindlingError {
    KindlingError::DownloadFailed {
        url: url.into(),
        reason: reason.to_string(),
    }
}

/// Creates a command failed error
pub fn command_failed(program: impl Into<String>, reason: impl Into<String>) -> KindlingError {
    KindlingError::CommandFailed {
        program: program.into(),
        reason: reason.into(),
    }
}
