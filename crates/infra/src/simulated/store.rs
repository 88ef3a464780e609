use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use flowguard_core::Flow;
use flowguard_editor::{FlowStore, ServiceError};
use tracing::info;

use crate::latency::SimulatedLatency;

/// Flow store with name-dependent latency.
///
/// Each save bumps `version` and stamps `saved_at`, so the returned flow
/// differs from the one submitted.
#[derive(Debug)]
pub struct SimulatedFlowStore {
    latency: SimulatedLatency,
    fail_next: AtomicUsize,
    saved: Mutex<Vec<Flow>>,
}

impl SimulatedFlowStore {
    pub fn new(latency: SimulatedLatency) -> Self {
        Self {
            latency,
            fail_next: AtomicUsize::new(0),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Make the next `count` saves fail with `ServiceError::Unavailable`.
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Every flow persisted so far, in completion order.
    pub fn saved(&self) -> Vec<Flow> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn take_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl FlowStore for SimulatedFlowStore {
    async fn save_flow(&self, flow: Flow) -> Result<Flow, ServiceError> {
        let delay = self.latency.save_delay(flow.name.as_str());
        info!(name = %flow.name, delay_ms = delay.as_millis() as u64, "saving flow");
        tokio::time::sleep(delay).await;

        if self.take_failure() {
            return Err(ServiceError::Unavailable("simulated store outage".into()));
        }

        let persisted = Flow {
            version: flow.version + 1,
            saved_at: Some(Utc::now()),
            ..flow
        };
        self.saved
            .lock()
            .map_err(|_| ServiceError::Unavailable("store lock poisoned".into()))?
            .push(persisted.clone());
        Ok(persisted)
    }
}
