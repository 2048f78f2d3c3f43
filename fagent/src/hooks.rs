//! Lifecycle hooks invoked by [`crate::ChatAgent`].
//!
//! ```rust
//! use fagent::{AgentHooks, NoopAgentHooks};
//!
//! fn assert_hooks_trait(_hooks: &dyn AgentHooks) {}
//!
//! assert_hooks_trait(&NoopAgentHooks);
//! ```

use std::time::Duration;

use crate::{AgentError, AgentTurnResult};

pub trait AgentHooks: Send + Sync {
    fn on_turn_start(&self, _agent_id: &str, _model: &str, _tool_count: usize) {}

    fn on_tool_round_trip(&self, _agent_id: &str, _round_trip: usize, _tool_calls: usize) {}

    fn on_turn_success(&self, _agent_id: &str, _result: &AgentTurnResult, _elapsed: Duration) {}

    fn on_turn_failure(&self, _agent_id: &str, _error: &AgentError, _elapsed: Duration) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAgentHooks;

impl AgentHooks for NoopAgentHooks {}
