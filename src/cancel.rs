//! Caller-owned cancellation for the statistics fetch
//!
//! A `CancelHandle` and its `Cancellation` share a `tokio::sync::watch`
//! channel. Cancelling is sticky: once set, every clone observes it.

use tokio::sync::watch;

/// Sending half, kept by whoever may abort the run
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Create a handle and the context to pass into the fetch
    pub fn pair() -> (Self, Cancellation) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, Cancellation { rx: Some(rx) })
    }

    /// Cancel every context derived from this handle
    pub fn cancel(&self) {
        // send_replace stores the value even with no live receivers
        self.tx.send_replace(true);
    }
}

/// Receiving half, passed into `read_tests_to_run`
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: Option<watch::Receiver<bool>>,
}

impl Cancellation {
    /// A context that is never cancelled
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once the context is cancelled
    ///
    /// Never resolves for `Cancellation::never()`, or if the handle is
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        let cancelled = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if !cancelled {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}
