//! Common `fprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, Message, ModelCatalog, ModelEventStream, ModelProvider, ModelRequest,
    ModelRequestBuilder, ModelResponse, ModelRouter, OutputItem, ProviderError,
    ProviderErrorKind, ProviderFuture, ProviderId, ProviderRegistry, Role, StopReason,
    StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult, VecEventStream,
};
pub use fcommon::{BoxFuture, MetadataMap};
