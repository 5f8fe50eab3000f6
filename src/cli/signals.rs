//! Shutdown signal handling for the interactive session

use tokio::sync::mpsc;
use tracing::debug;

/// Why the session is being asked to end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

/// Listens for OS shutdown signals
pub struct ShutdownSignal {
    receiver: mpsc::Receiver<ShutdownReason>,
}

impl ShutdownSignal {
    /// Start listening for SIGINT (and SIGTERM on unix)
    pub fn listen() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);

        let tx_int = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Received SIGINT");
                let _ = tx_int.send(ShutdownReason::Interrupt).await;
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                sigterm.recv().await;
                debug!("Received SIGTERM");
                let _ = tx.send(ShutdownReason::Terminate).await;
            });
        }

        Ok(Self { receiver: rx })
    }

    /// Wait for the next signal; pending forever if none can arrive
    pub async fn recv(&mut self) -> ShutdownReason {
        match self.receiver.recv().await {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }
}
