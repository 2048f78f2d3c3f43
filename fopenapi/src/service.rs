//! Stored-spec management and per-spec tool loading.

use std::sync::Arc;

use fcommon::SpecId;
use fstore::{NewSpec, SpecStore, StoredSpec};
use ftooling::ToolRegistry;
use serde_json::Value;

use crate::assembler::{ToolAssembler, ToolSet};
use crate::document::Operation;
use crate::error::OpenApiError;
use crate::extract::parse_operations;

/// CRUD over stored specs; documents are validated before they are stored.
#[derive(Clone)]
pub struct SpecService {
    store: Arc<dyn SpecStore>,
}

impl SpecService {
    pub fn new(store: Arc<dyn SpecStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn SpecStore> {
        Arc::clone(&self.store)
    }

    pub async fn create_spec(
        &self,
        name: impl Into<String>,
        document: Value,
    ) -> Result<StoredSpec, OpenApiError> {
        parse_operations(&document)?;
        Ok(self.store.create(NewSpec::new(name, document)).await?)
    }

    pub async fn list_specs(&self) -> Result<Vec<StoredSpec>, OpenApiError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_spec(&self, id: &SpecId) -> Result<Option<StoredSpec>, OpenApiError> {
        Ok(self.store.find(id).await?)
    }

    pub async fn require_spec(&self, id: &SpecId) -> Result<StoredSpec, OpenApiError> {
        self.get_spec(id)
            .await?
            .ok_or_else(|| OpenApiError::spec_not_found(id))
    }

    /// Returns whether a spec was removed; unknown ids are not an error.
    pub async fn delete_spec(&self, id: &SpecId) -> Result<bool, OpenApiError> {
        let existed = self.store.find(id).await?.is_some();
        self.store.delete(id).await?;
        Ok(existed)
    }

    pub async fn operations(&self, id: &SpecId) -> Result<Vec<Operation>, OpenApiError> {
        let spec = self.require_spec(id).await?;
        parse_operations(&spec.document)
    }
}

/// Loads tools for stored specs. Every call assembles fresh tools.
#[derive(Clone)]
pub struct OpenApiTools {
    specs: SpecService,
    assembler: ToolAssembler,
}

impl OpenApiTools {
    pub fn new(specs: SpecService, assembler: ToolAssembler) -> Self {
        Self { specs, assembler }
    }

    pub fn specs(&self) -> &SpecService {
        &self.specs
    }

    pub async fn tools_by_spec_id(&self, id: &SpecId) -> Result<ToolSet, OpenApiError> {
        let spec = self.specs.require_spec(id).await?;
        self.assembler.assemble(&spec.document)
    }

    pub async fn registry_for_spec(&self, id: &SpecId) -> Result<ToolRegistry, OpenApiError> {
        Ok(self.tools_by_spec_id(id).await?.into_registry())
    }
}
