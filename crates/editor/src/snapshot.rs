//! Last-saved flow snapshot.

use flowguard_core::Flow;

use crate::error::SnapshotError;

/// Keeps the most recently saved flow across sessions.
///
/// Read once when a session starts and written after each accepted save.
/// It sits outside the race-sensitive path: failures are logged and ignored.
pub trait SnapshotStore: Send + Sync {
    fn load_last(&self) -> Result<Option<Flow>, SnapshotError>;

    fn store_last(&self, flow: &Flow) -> Result<(), SnapshotError>;
}
