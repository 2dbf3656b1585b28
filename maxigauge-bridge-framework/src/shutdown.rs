//! Cooperative stop signalling.
//!
//! A [`StopHandle`] is the single writer; any number of [`StopSignal`]
//! readers observe it. Once stopped, a handle never resets.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Settable from any thread or task; cheap to clone.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StopHandle {
    /// Create a handle in the running state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        if !self.tx.send_replace(true) {
            tracing::debug!("Stop requested");
        }
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Create a reader of this handle.
    pub fn signal(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Reader side of a [`StopHandle`].
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait up to `timeout` for a stop request.
    ///
    /// Returns `true` as soon as a stop is requested (immediately if one
    /// already was), `false` once the full timeout elapsed without one.
    pub async fn wait(&mut self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            // Beyond the clock's range: only a stop ends the wait.
            self.stopped().await;
            return true;
        };

        let outcome = tokio::time::timeout_at(deadline, self.rx.wait_for(|stopped| *stopped))
            .await
            .map(|changed| changed.is_ok());

        match outcome {
            Ok(true) => true,
            Ok(false) => {
                // Every handle is gone, nothing can stop us any more.
                tokio::time::sleep_until(deadline).await;
                false
            }
            Err(_) => false,
        }
    }

    /// Wait until a stop is requested.
    pub async fn stopped(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Stop `handle` on Ctrl+C (and SIGTERM on Unix).
///
/// Spawns a background task; the returned join handle may be ignored.
pub fn stop_on_signal(handle: StopHandle) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl+C"),
            _ = terminate => tracing::info!("Received SIGTERM"),
        }

        handle.stop();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let handle = StopHandle::new();
        let mut signal = handle.signal();

        let start = Instant::now();
        assert!(!signal.wait(Duration::from_secs(10)).await);
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_on_stop() {
        let handle = StopHandle::new();
        let mut signal = handle.signal();

        let stopper = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.stop();
        });

        let start = Instant::now();
        assert!(signal.wait(Duration::from_secs(3600)).await);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_wait_unbounded_timeout() {
        let handle = StopHandle::new();
        let mut signal = handle.signal();

        let stopper = handle.clone();
        tokio::spawn(async move { stopper.stop() });

        let stopped = tokio::time::timeout(Duration::from_secs(5), signal.wait(Duration::MAX))
            .await
            .unwrap();
        assert!(stopped);
    }

    #[tokio::test]
    async fn test_already_stopped() {
        let handle = StopHandle::new();
        handle.stop();
        handle.stop();

        let mut signal = handle.signal();
        assert!(signal.is_stopped());
        assert!(handle.is_stopped());
        assert!(signal.wait(Duration::from_secs(3600)).await);
    }

    #[tokio::test]
    async fn test_stop_from_other_thread() {
        let handle = StopHandle::new();
        let mut signal = handle.signal();

        let stopper = handle.clone();
        std::thread::spawn(move || stopper.stop());

        tokio::time::timeout(Duration::from_secs(5), signal.stopped())
            .await
            .unwrap();
    }
}
