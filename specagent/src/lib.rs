//! Unified facade over the specagent workspace crates.
//!
//! This crate is the single dependency for most applications: it loads
//! [`AppConfig`], installs logging, opens the configured spec store, and wires
//! stored OpenAPI documents into a [`ChatAgent`] as callable tools.
//!
//! ```rust
//! use specagent::{AppConfig, ProviderRegistry, StoreKind, build_runtime};
//!
//! let config = AppConfig {
//!     store_kind: StoreKind::Memory,
//!     ..AppConfig::default()
//! };
//!
//! let runtime = build_runtime(config, ProviderRegistry::new()).expect("runtime should build");
//! assert_eq!(runtime.agent_config().model, "gpt-5-nano");
//! assert_eq!(runtime.agent().policy().max_tool_round_trips, 4);
//! ```

mod config;
mod error;
mod logging;
mod macros;

pub mod prelude;
pub mod runtime;
pub mod util;

pub use fagent;
pub use fcommon;
pub use fobserve;
pub use fopenapi;
pub use fprovider;
pub use fstore;
pub use ftooling;

pub use config::{
    AppConfig, ConfigError, ConfigErrorKind, DEFAULT_HTTP_TIMEOUT_SECS, LogLevel, ProviderKeys,
    StoreKind,
};
pub use error::{SpecAgentError, SpecAgentErrorKind};
pub use logging::init_logging;

pub use fagent::{
    AgentConfig, AgentError, AgentErrorKind, AgentErrorPhase, AgentEvent, AgentEventStream,
    AgentHooks, AgentPolicy, AgentRequest, AgentTurnResult, ChatAgent,
    DEFAULT_MAX_TOOL_ROUND_TRIPS, NoopAgentHooks,
};
pub use fcommon::{BoxFuture, GenerationOptions, MetadataMap, SessionId, SpecId, TraceId};
pub use fobserve::{
    MetricsObservabilityHooks, SafeAgentHooks, SafeRequestHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
pub use fopenapi::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, OpenApiError, OpenApiErrorKind,
    OpenApiTool, OpenApiTools, Operation, RequestExecutor, RequestHooks, ReqwestTransport,
    SpecService, ToolAssembler, ToolSet, parse_operations,
};
pub use fprovider::{
    BoxedEventStream, Message, ModelCatalog, ModelProvider, ModelRequest, ModelResponse,
    ModelRouter, OutputItem, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    ProviderRegistry, Role, StopReason, StreamEvent, TokenUsage, ToolCall, ToolDefinition,
    ToolResult, VecEventStream,
};
pub use fstore::{
    InMemorySpecStore, NewSpec, SpecStore, StoreConfig, StoreError, StoreErrorKind, StoredSpec,
    create_spec_store,
};
pub use ftooling::{
    DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
    ToolExecutionResult, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
};

pub use runtime::{SpecAgentRuntime, build_runtime, build_runtime_with};
pub use util::{
    assistant_message, parse_provider_id, parse_spec_id, system_message, user_message,
};
