//! Shutdown coordination.

use tokio::sync::broadcast;

use crate::lifecycle::signals;

/// Coordinator for graceful shutdown.
///
/// The server and the rule reload task each hold a receiver.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger once the process is asked to terminate.
    pub async fn trigger_on_signal(self) {
        signals::wait_for_termination().await;
        tracing::info!("Termination signal received");
        self.trigger();
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut first = shutdown.subscribe();
        let mut second = shutdown.subscribe();

        shutdown.trigger();

        assert!(first.recv().await.is_ok());
        assert!(second.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_subscribers_is_harmless() {
        Shutdown::default().trigger();
    }
}
