use crate::process::{CommandSpawner, Spawner};
use crate::signals::{OsSignals, RelaySignal, SignalSource};
use llauncher_core::{LauncherError, Result, LAUNCHER_FAILURE_EXIT_CODE};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use tokio::process::Child;
use tracing::{debug, error, info, warn};

/// Lifecycle of a supervised child.
///
/// `Exited`, `SignalTerminated` and `SpawnFailed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    NotStarted,
    Spawning,
    Running { pid: u32 },
    Exited(i32),
    SignalTerminated(i32),
    SpawnFailed,
}

impl SupervisorState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SupervisorState::Exited(_)
                | SupervisorState::SignalTerminated(_)
                | SupervisorState::SpawnFailed
        )
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorState::NotStarted => write!(f, "not started"),
            SupervisorState::Spawning => write!(f, "spawning"),
            SupervisorState::Running { pid } => write!(f, "running (pid {})", pid),
            SupervisorState::Exited(code) => write!(f, "exited with {}", code),
            SupervisorState::SignalTerminated(signal) => {
                write!(f, "terminated by signal {}", signal)
            }
            SupervisorState::SpawnFailed => write!(f, "spawn failed"),
        }
    }
}

/// How the child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited(i32),
    Signaled(i32),
}

impl ExitOutcome {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signaled(signal);
            }
        }

        ExitOutcome::Exited(LAUNCHER_FAILURE_EXIT_CODE)
    }

    /// Exit code the launcher should report for this outcome.
    pub fn exit_code(&self, policy: SignalExitPolicy) -> i32 {
        match *self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(signal) => policy.exit_code(signal),
        }
    }
}

/// Exit code reported when the child was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalExitPolicy {
    /// `128 + signal`, as POSIX shells report it.
    #[default]
    ShellConvention,
    Fixed(i32),
}

impl SignalExitPolicy {
    pub fn exit_code(&self, signal: i32) -> i32 {
        match *self {
            SignalExitPolicy::ShellConvention => 128 + signal,
            SignalExitPolicy::Fixed(code) => code,
        }
    }
}

/// Runs one child process to completion, relaying termination signals to it.
pub struct ProcessSupervisor<S = CommandSpawner> {
    spawner: S,
    signal_policy: SignalExitPolicy,
    state: SupervisorState,
}

impl ProcessSupervisor<CommandSpawner> {
    pub fn new() -> Self {
        Self::with_spawner(CommandSpawner)
    }
}

impl Default for ProcessSupervisor<CommandSpawner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Spawner> ProcessSupervisor<S> {
    pub fn with_spawner(spawner: S) -> Self {
        Self {
            spawner,
            signal_policy: SignalExitPolicy::default(),
            state: SupervisorState::NotStarted,
        }
    }

    pub fn with_signal_policy(mut self, policy: SignalExitPolicy) -> Self {
        self.signal_policy = policy;
        self
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn signal_policy(&self) -> SignalExitPolicy {
        self.signal_policy
    }

    /// Run `program` with `args`, relaying SIGINT and SIGTERM received by
    /// this process.
    ///
    /// The handlers are installed before the spawn, so a signal arriving in
    /// between is delivered to the child once it exists.
    pub async fn run(&mut self, program: &Path, args: &[String]) -> Result<ExitOutcome> {
        self.ensure_not_started()?;
        let signals = OsSignals::new()?;
        self.run_with_signals(program, args, signals).await
    }

    /// Run `program` with `args`, relaying whatever `signals` yields.
    ///
    /// Waits without a timeout. A single spawn is attempted; failure is
    /// returned as [`LauncherError::SpawnError`].
    pub async fn run_with_signals<G: SignalSource>(
        &mut self,
        program: &Path,
        args: &[String],
        mut signals: G,
    ) -> Result<ExitOutcome> {
        self.ensure_not_started()?;
        self.transition(SupervisorState::Spawning);

        let mut child = match self.spawner.spawn(program, args) {
            Ok(child) => child,
            Err(e) => {
                self.transition(SupervisorState::SpawnFailed);
                error!(program = %program.display(), error = %e, "Failed to start child process");
                return Err(LauncherError::SpawnError(format!(
                    "failed to start {}: {}",
                    program.display(),
                    e
                )));
            }
        };

        // The pid stays valid until `wait` reaps the child.
        let Some(pid) = child.id() else {
            self.transition(SupervisorState::SpawnFailed);
            return Err(LauncherError::SpawnError(format!(
                "{} exited before its pid could be read",
                program.display()
            )));
        };

        self.transition(SupervisorState::Running { pid });
        info!(program = %program.display(), pid, "Child process started");

        let mut relaying = true;
        let status = loop {
            tokio::select! {
                status = child.wait() => break status,
                received = signals.recv(), if relaying => match received {
                    Some(signal) => {
                        info!(pid, signal = signal.name(), "Forwarding signal to child");
                        if let Err(e) = forward_signal(&mut child, pid, signal) {
                            warn!(pid, signal = signal.name(), error = %e, "Failed to forward signal");
                        }
                    }
                    None => {
                        debug!(pid, "Signal source closed, no longer relaying");
                        relaying = false;
                    }
                },
            }
        };

        let status = status.map_err(|e| {
            error!(pid, error = %e, "Failed to wait for child process");
            LauncherError::IoError(e)
        })?;

        let outcome = ExitOutcome::from_status(status);
        match outcome {
            ExitOutcome::Exited(code) => {
                self.transition(SupervisorState::Exited(code));
                info!(pid, code, "Child process exited");
            }
            ExitOutcome::Signaled(signal) => {
                self.transition(SupervisorState::SignalTerminated(signal));
                warn!(
                    pid,
                    signal,
                    exit_code = outcome.exit_code(self.signal_policy),
                    "Child process terminated by signal"
                );
            }
        }

        Ok(outcome)
    }

    fn ensure_not_started(&self) -> Result<()> {
        if self.state == SupervisorState::NotStarted {
            Ok(())
        } else {
            Err(LauncherError::InvalidState(format!(
                "supervisor already used ({})",
                self.state
            )))
        }
    }

    fn transition(&mut self, next: SupervisorState) {
        debug!(from = %self.state, to = %next, "Supervisor state change");
        self.state = next;
    }
}

#[cfg(unix)]
fn forward_signal(_child: &mut Child, pid: u32, signal: RelaySignal) -> io::Result<()> {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), signal.as_nix()).map_err(io::Error::from)
}

// Without POSIX signals the only way to stop the child is to kill it.
#[cfg(not(unix))]
fn forward_signal(child: &mut Child, _pid: u32, _signal: RelaySignal) -> io::Result<()> {
    child.start_kill()
}
