//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Two `FlowName`s
/// holding the same text are the same name; there is no identity to track.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A flow display name: trimmed and never blank.
///
/// Raw editor input goes through `FlowName::parse`, so surrounding whitespace
/// never reaches the checker or the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlowName(String);

impl ValueObject for FlowName {}

impl FlowName {
    /// Trim `raw` and reject it when nothing is left.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("flow name must not be blank"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Built-in names known to be trimmed and non-blank.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert_eq!(name, name.trim());
        debug_assert!(!name.is_empty());
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for FlowName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FlowName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FlowName> for String {
    fn from(value: FlowName) -> Self {
        value.0
    }
}

impl PartialEq<str> for FlowName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FlowName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
