//! Chat agent orchestration over routed model providers.
//!
//! An agent prepends its system prompt, advertises the tools of an optional
//! [`ToolRegistry`], and loops tool calls back to the model until it answers
//! or the round-trip limit is reached.
//!
//! ```rust
//! use fagent::{AgentConfig, AgentPolicy, AgentRequest};
//! use fprovider::Message;
//!
//! let config = AgentConfig::default();
//! assert_eq!(config.id, "some-agent");
//! assert_eq!(config.model, "gpt-5-nano");
//!
//! let request = AgentRequest::new(config, vec![Message::user("What is the weather in Paris?")]);
//! assert_eq!(request.session_id.as_str(), "some-agent");
//! assert_eq!(AgentPolicy::default().max_tool_round_trips, 4);
//! ```

mod agent;
mod error;
mod hooks;
mod types;

pub mod prelude {
    pub use crate::{
        AgentConfig, AgentError, AgentErrorKind, AgentErrorPhase, AgentEvent, AgentEventStream,
        AgentHooks, AgentPolicy, AgentRequest, AgentTurnResult, ChatAgent, NoopAgentHooks,
    };
    pub use fcommon::{MetadataMap, SessionId};
    pub use ftooling::{Tool, ToolError, ToolErrorKind, ToolRegistry, ToolRuntimeHooks};
}

pub use agent::{AgentPolicy, ChatAgent, DEFAULT_MAX_TOOL_ROUND_TRIPS};
pub use error::{AgentError, AgentErrorKind, AgentErrorPhase};
pub use hooks::{AgentHooks, NoopAgentHooks};
pub use types::{
    AgentConfig, AgentEvent, AgentEventStream, AgentRequest, AgentTurnResult,
    DEFAULT_AGENT_ID, DEFAULT_AGENT_MODEL, DEFAULT_SYSTEM_PROMPT,
};
pub use fcommon::{MetadataMap, SessionId};
pub use ftooling::{Tool, ToolError, ToolErrorKind, ToolRegistry, ToolRuntimeHooks};
