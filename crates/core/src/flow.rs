//! The flow entity edited by the name pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::FlowId;
use crate::value_object::FlowName;

/// Identifier of the built-in flow used when no snapshot exists.
pub const DEFAULT_FLOW_ID: FlowId = FlowId::from_u128(1);

/// Name of the built-in flow used when no snapshot exists.
pub const DEFAULT_FLOW_NAME: &str = "My Flow";

/// A flow record.
///
/// `name` is the only field the editor changes. `version` and `saved_at` are
/// assigned by the store on each save and come back in the persisted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub id: FlowId,
    pub name: FlowName,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Flow {
    pub fn new(id: FlowId, name: FlowName) -> Self {
        Self {
            id,
            name,
            version: 0,
            saved_at: None,
        }
    }

    /// Copy of this flow carrying `name`. Identity and bookkeeping are kept.
    pub fn with_name(&self, name: FlowName) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    /// True when `candidate` (already trimmed) equals the current name.
    pub fn has_name(&self, candidate: &str) -> bool {
        self.name.as_str() == candidate
    }
}

impl Default for Flow {
    fn default() -> Self {
        Self::new(
            DEFAULT_FLOW_ID,
            FlowName::from_static(DEFAULT_FLOW_NAME),
        )
    }
}

impl Entity for Flow {
    type Id = FlowId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
