// Process creation for the supervised child.

use llauncher_core::{LauncherError, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// Creates the child process for a supervisor.
///
/// Passed into [`crate::ProcessSupervisor`] so tests can substitute the
/// program that actually runs.
pub trait Spawner: Send + Sync {
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Child>;
}

/// Spawns the program directly, sharing the parent's stdout and stderr.
/// Stdin is not connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandSpawner;

impl Spawner for CommandSpawner {
    fn spawn(&self, program: &Path, args: &[String]) -> io::Result<Child> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false)
            .spawn()
    }
}

/// Locate an executable on `PATH`. Names containing a path separator are
/// checked in place.
pub fn resolve_executable(name: &str) -> Result<PathBuf> {
    which::which(name)
        .map_err(|e| LauncherError::ExecutableNotFound(format!("{}: {}", name, e)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_executable_on_path() {
        let path = resolve_executable("sh").unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("sh"));
    }

    #[test]
    fn test_resolve_missing_executable() {
        let err = resolve_executable("llauncher-no-such-binary-3f9a").unwrap_err();
        assert!(matches!(err, LauncherError::ExecutableNotFound(_)));
    }

    #[tokio::test]
    async fn test_command_spawner_passes_args() {
        let args = vec!["-c".to_string(), "exit 3".to_string()];
        let mut child = CommandSpawner.spawn(Path::new("sh"), &args).unwrap();
        let status = child.wait().await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_command_spawner_missing_program() {
        let err = CommandSpawner
            .spawn(Path::new("/nonexistent/llama-server"), &[])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
