//! One-shot cancellation for a single build assembly.
//!
//! The orchestrator keeps the [`CancellationHandle`]; the assembly and every
//! fetch it starts observe clones of the [`CancellationSignal`]. The signal is
//! raised when the handle is cancelled or dropped, so an abandoned lookup
//! never leaves its assembly running unobserved.

use tokio::sync::watch;

/// Create a linked handle and signal.
pub fn cancellation_pair() -> (CancellationHandle, CancellationSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        CancellationHandle { sender },
        CancellationSignal { receiver },
    )
}

/// Owning side of the cancellation pair.
#[derive(Debug)]
pub struct CancellationHandle {
    sender: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Raise the signal for every observer.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for CancellationHandle {
    fn drop(&mut self) {
        self.sender.send_replace(true);
    }
}

/// Observer side of the cancellation pair.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    receiver: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// A signal that is never raised.
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self { receiver }
    }

    /// Whether the signal has been raised.
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once the signal is raised; pend forever otherwise.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|raised| *raised).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
