//! Model-name catalog and provider routing.
//!
//! ```rust
//! use fprovider::{ModelCatalog, ProviderId};
//!
//! let catalog = ModelCatalog::default();
//! assert_eq!(catalog.provider_for("gpt-5-nano").ok(), Some(ProviderId::OpenAi));
//! assert_eq!(catalog.provider_for("claude-opus-4.1").ok(), Some(ProviderId::Anthropic));
//! assert!(catalog.provider_for("gpt-2").is_err());
//! ```

use std::sync::Arc;

use fcommon::Registry;

use crate::{ModelProvider, ProviderError, ProviderId, ProviderRegistry};

const OPENAI_MODELS: [&str; 5] = [
    "gpt-5",
    "gpt-5-mini",
    "gpt-5-nano",
    "gpt-4.1-mini",
    "gpt-4.1-nano",
];

const GOOGLE_MODELS: [&str; 6] = [
    "gemini-2.5-pro",
    "gemini-2.5-flash",
    "gemini-2.5-lite",
    "gemini-2.0-pro",
    "gemini-2.0-flash",
    "gemini-2.0-lite",
];

const ANTHROPIC_MODELS: [&str; 5] = [
    "claude-sonnet-3.7",
    "claude-sonnet-4",
    "claude-haiku-3.5",
    "claude-opus-4",
    "claude-opus-4.1",
];

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Registry<String, ProviderId>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        for model in OPENAI_MODELS {
            catalog.register(model, ProviderId::OpenAi);
        }
        for model in GOOGLE_MODELS {
            catalog.register(model, ProviderId::Google);
        }
        for model in ANTHROPIC_MODELS {
            catalog.register(model, ProviderId::Anthropic);
        }
        catalog
    }
}

impl ModelCatalog {
    pub fn empty() -> Self {
        Self {
            models: Registry::new(),
        }
    }

    pub fn register(&mut self, model: impl Into<String>, provider: ProviderId) {
        self.models.insert(model.into(), provider);
    }

    pub fn with_model(mut self, model: impl Into<String>, provider: ProviderId) -> Self {
        self.register(model, provider);
        self
    }

    pub fn provider_for(&self, model: &str) -> Result<ProviderId, ProviderError> {
        self.models
            .get(model)
            .copied()
            .ok_or_else(|| ProviderError::unknown_model(model))
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn models_for(&self, provider: ProviderId) -> Vec<&str> {
        self.models
            .iter()
            .filter(|(_, id)| **id == provider)
            .map(|(model, _)| model.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Resolves a model name to the registered provider serving it.
#[derive(Clone, Default)]
pub struct ModelRouter {
    catalog: ModelCatalog,
    providers: Arc<ProviderRegistry>,
}

impl ModelRouter {
    pub fn new(catalog: ModelCatalog, providers: ProviderRegistry) -> Self {
        Self {
            catalog,
            providers: Arc::new(providers),
        }
    }

    pub fn with_providers(providers: ProviderRegistry) -> Self {
        Self::new(ModelCatalog::default(), providers)
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn resolve(&self, model: &str) -> Result<Arc<dyn ModelProvider>, ProviderError> {
        let provider_id = self.catalog.provider_for(model)?;
        self.providers.get(provider_id).ok_or_else(|| {
            ProviderError::unavailable("no provider registered for this model")
                .with_provider(provider_id)
                .with_model(model)
        })
    }
}
