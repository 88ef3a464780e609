use std::collections::HashSet;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flowguard_editor::{NameRegistry, ServiceError};
use tracing::info;

use crate::latency::SimulatedLatency;

/// Name registry that treats names containing a marker word as taken.
///
/// Names can also be registered explicitly. Comparison is case-insensitive.
#[derive(Debug)]
pub struct SimulatedNameRegistry {
    delay: Duration,
    taken_marker: String,
    registered: RwLock<HashSet<String>>,
    completed: AtomicU64,
}

impl SimulatedNameRegistry {
    pub fn new(latency: &SimulatedLatency) -> Self {
        Self {
            delay: latency.check,
            taken_marker: latency.taken_marker.to_lowercase(),
            registered: RwLock::new(HashSet::new()),
            completed: AtomicU64::new(0),
        }
    }

    /// Mark `name` as belonging to another flow.
    pub fn register(&self, name: &str) -> Result<(), ServiceError> {
        self.registered
            .write()
            .map_err(|_| ServiceError::Unavailable("registry lock poisoned".into()))?
            .insert(name.to_lowercase());
        Ok(())
    }

    /// Number of checks that ran to completion (superseded ones included).
    pub fn completed_checks(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameRegistry for SimulatedNameRegistry {
    async fn is_name_taken(&self, name: &str) -> Result<bool, ServiceError> {
        info!(name, delay_ms = self.delay.as_millis() as u64, "validating name");
        tokio::time::sleep(self.delay).await;

        let lowered = name.to_lowercase();
        let taken = lowered.contains(&self.taken_marker)
            || self
                .registered
                .read()
                .map_err(|_| ServiceError::Unavailable("registry lock poisoned".into()))?
                .contains(&lowered);

        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(taken)
    }
}
