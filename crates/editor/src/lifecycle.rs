//! Teardown signal shared by a session and everything it spawns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Cloneable teardown handle.
///
/// Once torn down it stays torn down; signaling again has no further effect.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    torn_down: AtomicBool,
    notify: Notify,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal teardown. Returns `true` only for the call that performed it.
    pub fn teardown(&self) -> bool {
        if self.inner.torn_down.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::SeqCst)
    }

    /// Resolves once teardown has been signaled (immediately if it already was).
    pub async fn torn_down(&self) {
        // Register before checking the flag so a concurrent teardown is not missed.
        let notified = self.inner.notify.notified();
        if self.is_torn_down() {
            return;
        }
        notified.await;
    }

    /// Pass `value` through only while the lifecycle is still live.
    pub fn gate<T>(&self, value: T) -> Option<T> {
        (!self.is_torn_down()).then_some(value)
    }
}
