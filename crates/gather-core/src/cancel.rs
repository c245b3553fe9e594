//! Cooperative cancellation for engine operations.
//!
//! Every service operation takes a [`CancelToken`] and checks it on entry
//! and before each write. A cancelled operation reports
//! [`crate::Error::Cancelled`] — never a silent success, never a validation
//! failure.

use std::sync::OnceLock;

use tokio::sync::watch;

/// The triggering half; typically owned by the server runtime and fired on
/// shutdown. Dropping the handle is equivalent to cancelling: waiters treat
/// a closed channel as a stop signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
  tx: watch::Sender<bool>,
}

/// A cheaply cloneable cancellation flag observed by engine operations.
#[derive(Debug, Clone)]
pub struct CancelToken {
  rx: watch::Receiver<bool>,
}

impl CancelHandle {
  pub fn new() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
  }

  /// Flip the flag. Every outstanding token observes the change; repeat
  /// calls are no-ops.
  pub fn cancel(&self) {
    let _ = self.tx.send(true);
  }

  /// Mint a fresh token tied to this handle.
  pub fn token(&self) -> CancelToken {
    CancelToken { rx: self.tx.subscribe() }
  }
}

impl CancelToken {
  /// A token that can never fire, for callers with no cancellation path.
  pub fn never() -> Self {
    static NEVER: OnceLock<watch::Sender<bool>> = OnceLock::new();
    let tx = NEVER.get_or_init(|| watch::channel(false).0);
    CancelToken { rx: tx.subscribe() }
  }

  pub fn is_cancelled(&self) -> bool {
    *self.rx.borrow()
  }

  /// Resolve once cancellation fires (immediately if it already has, or if
  /// the handle was dropped).
  pub async fn cancelled(&self) {
    let mut rx = self.rx.clone();
    let _ = rx.wait_for(|cancelled| *cancelled).await;
  }
}
