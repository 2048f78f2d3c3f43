//! Stored spec records.

use std::time::SystemTime;

use fcommon::SpecId;
use serde_json::Value;

use crate::StoreError;

/// A document submitted for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpec {
    pub name: String,
    pub document: Value,
}

impl NewSpec {
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::invalid_request("spec name must not be empty"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSpec {
    pub id: SpecId,
    pub name: String,
    pub document: Value,
    pub created_at: SystemTime,
}

impl StoredSpec {
    pub(crate) fn from_new(id: SpecId, spec: NewSpec) -> Self {
        Self {
            id,
            name: spec.name,
            document: spec.document,
            created_at: SystemTime::now(),
        }
    }
}
