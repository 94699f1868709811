// External crates
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Process wide interruption signal.
///
/// - Cloned handles share the same underlying token.
/// - Calling `.trigger()` interrupts every waiter, including ones that start
///   waiting after the trigger.
/// - `.listen_for_signals()` wires SIGINT/SIGTERM (Ctrl+C on windows) to `.trigger()`.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    #[instrument(
        name = "log_stats_shutdown_channel",
        target = "helpers::shutdown",
        level = "trace"
    )]
    /// A fresh, untriggered signal
    pub fn new() -> Self {
        tracing::trace!("Creating new shutdown token");
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request an interruption
    #[instrument(
        name = "log_stats_shutdown_trigger",
        target = "helpers::shutdown",
        level = "trace",
        skip_all
    )]
    pub fn trigger(&self) {
        tracing::trace!("Shutdown triggered");
        self.token.cancel();
    }

    #[cfg(test)]
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once `.trigger()` has been called. Cancel safe.
    pub async fn wait_for_shutdown(&self) {
        self.token.cancelled().await;
    }

    /// Triggers shutdown on the first operator interrupt.
    ///
    /// The signal handlers are installed before this returns, so an interrupt
    /// that arrives before the listener task first runs is still observed.
    pub fn listen_for_signals(&self) {
        let signals = Signals::install();
        let shutdown = self.clone();
        tokio::spawn(async move {
            signals.recv().await;
            tracing::info!("Interrupt signal detected, finishing stream");
            shutdown.trigger();
        });
    }
}

/// Installed interrupt listeners. A listener that failed to install never fires.
#[cfg(unix)]
struct Signals {
    interrupt: Option<signal::unix::Signal>,
    terminate: Option<signal::unix::Signal>,
}

#[cfg(unix)]
impl Signals {
    fn install() -> Self {
        use signal::unix::{SignalKind, signal as listen};

        let interrupt = listen(SignalKind::interrupt())
            .inspect_err(|e| tracing::error!(error = %e, "Failed to install SIGINT handler"))
            .ok();
        let terminate = listen(SignalKind::terminate())
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to install SIGTERM handler"))
            .ok();

        Self {
            interrupt,
            terminate,
        }
    }

    async fn recv(mut self) {
        tokio::select! {
            _ = recv_or_pending(self.interrupt.as_mut()) => {},
            _ = recv_or_pending(self.terminate.as_mut()) => {},
        }
    }
}

#[cfg(unix)]
async fn recv_or_pending(listener: Option<&mut signal::unix::Signal>) {
    match listener {
        Some(l) => {
            // None means the runtime is shutting down, not an interrupt
            if l.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(windows)]
struct Signals {
    ctrl_c: Option<signal::windows::CtrlC>,
}

#[cfg(windows)]
impl Signals {
    fn install() -> Self {
        let ctrl_c = signal::windows::ctrl_c()
            .inspect_err(|e| tracing::error!(error = %e, "Failed to install Ctrl+C handler"))
            .ok();
        Self { ctrl_c }
    }

    async fn recv(mut self) {
        if let Some(l) = self.ctrl_c.as_mut() {
            if l.recv().await.is_some() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_clones() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();

        assert!(!waiter.is_triggered());
        shutdown.trigger();

        waiter.wait_for_shutdown().await;
        assert!(waiter.is_triggered());
    }

    #[tokio::test]
    async fn test_late_waiter_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        // Must not hang
        shutdown.clone().wait_for_shutdown().await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_before_listener_task_runs() {
        let shutdown = Shutdown::new();
        shutdown.listen_for_signals();

        // Delivered before the listener task has been polled even once
        let status = std::process::Command::new("kill")
            .arg("-TERM")
            .arg(std::process::id().to_string())
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(std::time::Duration::from_secs(5), shutdown.wait_for_shutdown())
            .await
            .unwrap();
        assert!(shutdown.is_triggered());
    }
}
