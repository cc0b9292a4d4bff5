use thiserror::Error;

/// Exit code the launcher reports for its own failures, as opposed to a
/// status forwarded from the child.
pub const LAUNCHER_FAILURE_EXIT_CODE: i32 = 1;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Config read error: {0}")]
    ConfigReadError(String),

    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    #[error("Config field error: {0}")]
    ConfigFieldError(String),

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Spawn error: {0}")]
    SpawnError(String),

    #[error("Signal error: {0}")]
    SignalError(String),

    #[error("Invalid supervisor state: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LauncherError {
    /// Every launcher-side failure collapses onto the reserved code.
    pub fn exit_code(&self) -> i32 {
        LAUNCHER_FAILURE_EXIT_CODE
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_map_to_reserved_exit_code() {
        let errors = [
            LauncherError::ConfigReadError("missing".to_string()),
            LauncherError::ConfigFieldError("text".to_string()),
            LauncherError::SpawnError("denied".to_string()),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), LAUNCHER_FAILURE_EXIT_CODE);
        }
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: LauncherError = io.into();
        assert!(err.to_string().contains("boom"));
    }
}
