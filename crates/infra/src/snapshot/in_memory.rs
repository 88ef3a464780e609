use std::sync::RwLock;

use flowguard_core::Flow;
use flowguard_editor::{SnapshotError, SnapshotStore};

/// In-memory snapshot store.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    last: RwLock<Option<Flow>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow(flow: Flow) -> Self {
        Self {
            last: RwLock::new(Some(flow)),
        }
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load_last(&self) -> Result<Option<Flow>, SnapshotError> {
        Ok(self.last.read().map_err(|_| SnapshotError::Poisoned)?.clone())
    }

    fn store_last(&self, flow: &Flow) -> Result<(), SnapshotError> {
        *self.last.write().map_err(|_| SnapshotError::Poisoned)? = Some(flow.clone());
        Ok(())
    }
}
