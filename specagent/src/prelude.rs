//! Common imports for most specagent applications.

pub use crate::{
    AgentConfig, AgentEvent, AgentPolicy, AgentTurnResult, AppConfig, ChatAgent, HttpTransport,
    Message, ModelProvider, ModelRouter, ProviderId, ProviderRegistry, Role, SpecAgentError,
    SpecAgentErrorKind, SpecAgentRuntime, SpecId, SpecService, StoreKind, StoredSpec, ToolCall,
    ToolRegistry,
};
pub use crate::{
    assistant_message, build_runtime, build_runtime_with, init_logging, parse_provider_id,
    parse_spec_id, system_message, user_message,
};
pub use crate::{sa_messages, sa_msg};
