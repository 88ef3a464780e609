//! Remote collaborators the pipeline talks to.
//!
//! Both calls may be slow, may run concurrently for different inputs and may
//! complete in any order. The pipeline never relies on completion order.

use async_trait::async_trait;
use flowguard_core::Flow;

use crate::error::ServiceError;

/// Uniqueness check for flow names.
#[async_trait]
pub trait NameRegistry: Send + Sync {
    /// Returns `true` when `name` already belongs to another flow.
    async fn is_name_taken(&self, name: &str) -> Result<bool, ServiceError>;
}

/// Persistence for flows.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Persist `flow` and return its canonical stored form.
    ///
    /// The returned flow may carry server-assigned fields (version, timestamp).
    async fn save_flow(&self, flow: Flow) -> Result<Flow, ServiceError>;
}
