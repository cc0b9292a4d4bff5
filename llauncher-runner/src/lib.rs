//! Supervision of the `llama-server` child process: spawning, signal relay
//! and exit-status mapping.

mod process;
mod signals;
mod supervisor;

pub use process::{resolve_executable, CommandSpawner, Spawner};
pub use signals::{signal_channel, ChannelSignals, OsSignals, RelaySignal, SignalSource};
pub use supervisor::{ExitOutcome, ProcessSupervisor, SignalExitPolicy, SupervisorState};
