//! One-shot readiness latch
//!
//! A `ReadinessSignal` moves from pending to resolved exactly once. Waiters
//! that subscribe after resolution complete immediately, so the signal
//! behaves like a latch rather than a broadcast event.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct ReadinessSignal {
    name: &'static str,
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessSignal {
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            name,
            tx: Arc::new(tx),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve the signal. Returns true only for the call that flipped it.
    pub fn resolve(&self) -> bool {
        let flipped = self.tx.send_if_modified(|resolved| {
            if *resolved {
                false
            } else {
                *resolved = true;
                true
            }
        });
        if flipped {
            tracing::debug!(signal = self.name, "Signal resolved");
        }
        flipped
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is resolved
    pub async fn when_ready(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so the channel cannot close here
        let _ = rx.wait_for(|resolved| *resolved).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_resolve_is_idempotent() {
        let signal = ReadinessSignal::new("content");
        assert!(!signal.is_resolved());
        assert!(signal.resolve());
        for _ in 0..5 {
            assert!(!signal.resolve());
        }
        assert!(signal.is_resolved());
    }

    #[tokio::test]
    async fn test_waiter_after_resolve_completes() {
        let signal = ReadinessSignal::new("content");
        signal.resolve();
        let result = timeout(Duration::from_millis(50), signal.when_ready()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_waiter_before_resolve_completes() {
        let signal = ReadinessSignal::new("content");
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.when_ready().await })
        };
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        signal.resolve();
        let result = timeout(Duration::from_millis(50), waiter).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolved_signal_keeps_waiting() {
        let signal = ReadinessSignal::new("content");
        let result = timeout(Duration::from_secs(60), signal.when_ready()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_clones_share_state() {
        let signal = ReadinessSignal::new("content");
        let other = signal.clone();
        other.resolve();
        assert!(signal.is_resolved());
        assert!(!signal.resolve());
    }
}
