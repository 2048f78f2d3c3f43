//! Agent configuration, turn request, and agent event types.

use std::fmt::{Debug, Formatter};
use std::pin::Pin;
use std::sync::Arc;

use fcommon::{GenerationOptions, MetadataMap, SessionId};
use fprovider::{Message, StopReason, TokenUsage, ToolCall};
use ftooling::{ToolExecutionResult, ToolRegistry};
use futures_core::Stream;

use crate::AgentError;

pub const DEFAULT_AGENT_ID: &str = "some-agent";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful agent.";
pub const DEFAULT_AGENT_MODEL: &str = "gpt-5-nano";

/// Identity, system prompt, and model of an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub id: String,
    pub system_prompt: String,
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_AGENT_ID.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: DEFAULT_AGENT_MODEL.to_string(),
        }
    }
}

impl AgentConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Clone)]
pub struct AgentRequest {
    pub agent: AgentConfig,
    pub messages: Vec<Message>,
    pub tools: Option<Arc<ToolRegistry>>,
    pub session_id: SessionId,
    pub options: GenerationOptions,
    pub metadata: MetadataMap,
}

impl AgentRequest {
    /// The session id defaults to the agent id.
    pub fn new(agent: AgentConfig, messages: Vec<Message>) -> Self {
        let session_id = SessionId::new(agent.id.clone());
        Self {
            agent,
            messages,
            tools: None,
            session_id,
            options: GenerationOptions::default(),
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<SessionId>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Debug for AgentRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRequest")
            .field("agent", &self.agent)
            .field("messages", &self.messages)
            .field(
                "tools",
                &self.tools.as_ref().map(|registry| registry.names()),
            )
            .field("session_id", &self.session_id)
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTurnResult {
    pub agent_id: String,
    pub assistant_message: String,
    pub tool_calls: Vec<ToolCall>,
    pub tool_round_trips: usize,
    pub tool_round_limit_reached: bool,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    TextDelta(String),
    ToolCallRequested(ToolCall),
    ToolResult(ToolExecutionResult),
    /// A failed tool call; `output` is what the model receives.
    ToolFailed { tool_call: ToolCall, output: String },
    Finished(AgentTurnResult),
}

pub type AgentEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<AgentEvent, AgentError>> + Send + 'a>>;
