//! Provider-agnostic model contracts for the specagent workspace.
//!
//! This crate owns the shared message model, the streaming contract, and the
//! catalog that routes model names to providers. Vendor adapters implement
//! [`ModelProvider`]; the OpenAI one ships behind the default
//! `provider-openai` feature.
//!
//! ```rust
//! use fprovider::{ModelRouter, ProviderRegistry};
//!
//! let router = ModelRouter::with_providers(ProviderRegistry::new());
//! assert!(router.catalog().contains("gpt-5-nano"));
//! assert!(router.resolve("gpt-5-nano").is_err());
//! ```

pub mod adapters;
mod catalog;
mod error;
mod model;
mod provider;
mod registry;
mod stream;

pub mod prelude;

pub use catalog::{ModelCatalog, ModelRouter};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{
    Message, ModelRequest, ModelRequestBuilder, ModelResponse, OutputItem, ProviderId, Role,
    StopReason, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use registry::ProviderRegistry;
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};
