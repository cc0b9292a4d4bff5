//! Sources of termination signals to relay to the child.

use async_trait::async_trait;
use llauncher_core::Result;
use tokio::sync::mpsc;

/// A termination-class signal the supervisor forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaySignal {
    Interrupt,
    Terminate,
}

impl RelaySignal {
    pub fn name(&self) -> &'static str {
        match self {
            RelaySignal::Interrupt => "SIGINT",
            RelaySignal::Terminate => "SIGTERM",
        }
    }

    #[cfg(unix)]
    pub fn as_nix(&self) -> nix::sys::signal::Signal {
        match self {
            RelaySignal::Interrupt => nix::sys::signal::Signal::SIGINT,
            RelaySignal::Terminate => nix::sys::signal::Signal::SIGTERM,
        }
    }
}

#[async_trait]
pub trait SignalSource: Send {
    /// Wait for the next signal. Returns `None` once the source is closed.
    async fn recv(&mut self) -> Option<RelaySignal>;
}

/// Signals delivered to this process by the operating system.
///
/// Creating it installs the handlers, so from then on SIGINT and SIGTERM no
/// longer terminate the launcher itself.
pub struct OsSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl OsSignals {
    #[cfg(unix)]
    pub fn new() -> Result<Self> {
        use llauncher_core::LauncherError;
        use tokio::signal::unix::{signal, SignalKind};

        let interrupt = signal(SignalKind::interrupt())
            .map_err(|e| LauncherError::SignalError(format!("SIGINT handler: {}", e)))?;
        let terminate = signal(SignalKind::terminate())
            .map_err(|e| LauncherError::SignalError(format!("SIGTERM handler: {}", e)))?;

        Ok(Self {
            interrupt,
            terminate,
        })
    }

    #[cfg(not(unix))]
    pub fn new() -> Result<Self> {
        Ok(Self {})
    }
}

#[async_trait]
impl SignalSource for OsSignals {
    #[cfg(unix)]
    async fn recv(&mut self) -> Option<RelaySignal> {
        tokio::select! {
            received = self.interrupt.recv() => received.map(|_| RelaySignal::Interrupt),
            received = self.terminate.recv() => received.map(|_| RelaySignal::Terminate),
        }
    }

    #[cfg(not(unix))]
    async fn recv(&mut self) -> Option<RelaySignal> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|_| RelaySignal::Interrupt)
    }
}

/// Signals injected through a channel, for embedding and tests.
pub struct ChannelSignals {
    rx: mpsc::UnboundedReceiver<RelaySignal>,
}

/// Create a channel-backed signal source and the sender that feeds it.
pub fn signal_channel() -> (mpsc::UnboundedSender<RelaySignal>, ChannelSignals) {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, ChannelSignals { rx })
}

#[async_trait]
impl SignalSource for ChannelSignals {
    async fn recv(&mut self) -> Option<RelaySignal> {
        self.rx.recv().await
    }
}
