//! Wrappers that keep a panicking hook from taking down a tool call, an HTTP
//! request, or an agent turn.
//!
//! ```rust
//! use fobserve::SafeAgentHooks;
//! use fagent::AgentHooks;
//!
//! struct Exploding;
//!
//! impl AgentHooks for Exploding {
//!     fn on_turn_start(&self, _agent_id: &str, _model: &str, _tool_count: usize) {
//!         panic!("boom");
//!     }
//! }
//!
//! SafeAgentHooks::new(Exploding).on_turn_start("some-agent", "gpt-5-nano", 0);
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use fagent::{AgentError, AgentHooks, AgentTurnResult};
use fopenapi::{HttpMethod, HttpRequest, OpenApiError, RequestHooks};
use fprovider::ToolCall;
use ftooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

/// Runs one hook callback; a panic is logged and dropped.
fn guarded(callback: &'static str, hook: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(hook)).is_err() {
        tracing::warn!(phase = "observe", event = "hook_panicked", callback);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: ToolRuntimeHooks> ToolRuntimeHooks for SafeToolHooks<H> {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        guarded("on_execution_start", || {
            self.inner.on_execution_start(tool_call, context)
        });
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        guarded("on_execution_success", || {
            self.inner
                .on_execution_success(tool_call, context, result, elapsed)
        });
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        guarded("on_execution_failure", || {
            self.inner
                .on_execution_failure(tool_call, context, error, elapsed)
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct SafeRequestHooks<H> {
    inner: H,
}

impl<H> SafeRequestHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: RequestHooks> RequestHooks for SafeRequestHooks<H> {
    fn on_request_start(&self, operation: &str, request: &HttpRequest) {
        guarded("on_request_start", || {
            self.inner.on_request_start(operation, request)
        });
    }

    fn on_request_success(
        &self,
        operation: &str,
        method: HttpMethod,
        status: u16,
        elapsed: Duration,
    ) {
        guarded("on_request_success", || {
            self.inner
                .on_request_success(operation, method, status, elapsed)
        });
    }

    fn on_request_failure(
        &self,
        operation: &str,
        method: HttpMethod,
        error: &OpenApiError,
        elapsed: Duration,
    ) {
        guarded("on_request_failure", || {
            self.inner
                .on_request_failure(operation, method, error, elapsed)
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct SafeAgentHooks<H> {
    inner: H,
}

impl<H> SafeAgentHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H: AgentHooks> AgentHooks for SafeAgentHooks<H> {
    fn on_turn_start(&self, agent_id: &str, model: &str, tool_count: usize) {
        guarded("on_turn_start", || {
            self.inner.on_turn_start(agent_id, model, tool_count)
        });
    }

    fn on_tool_round_trip(&self, agent_id: &str, round_trip: usize, tool_calls: usize) {
        guarded("on_tool_round_trip", || {
            self.inner
                .on_tool_round_trip(agent_id, round_trip, tool_calls)
        });
    }

    fn on_turn_success(&self, agent_id: &str, result: &AgentTurnResult, elapsed: Duration) {
        guarded("on_turn_success", || {
            self.inner.on_turn_success(agent_id, result, elapsed)
        });
    }

    fn on_turn_failure(&self, agent_id: &str, error: &AgentError, elapsed: Duration) {
        guarded("on_turn_failure", || {
            self.inner.on_turn_failure(agent_id, error, elapsed)
        });
    }
}
