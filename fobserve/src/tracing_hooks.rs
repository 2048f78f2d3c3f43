//! Tracing-based observability hooks for tool runtime, request, and agent phases.
//!
//! ```rust
//! use fobserve::TracingObservabilityHooks;
//! use fopenapi::RequestHooks;
//!
//! fn accepts_request_hooks(_hooks: &dyn RequestHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_request_hooks(&hooks);
//! ```

use std::time::Duration;

use fagent::{AgentError, AgentHooks, AgentTurnResult};
use fopenapi::{HttpMethod, HttpRequest, OpenApiError, RequestHooks};
use fprovider::ToolCall;
use ftooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            spec_id = context.metadata_value("spec_id"),
            trace_id = context.trace_id.as_ref().map(|id| id.as_str())
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            output_bytes = result.output.len() as u64,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            session_id = %context.session_id,
            spec_id = context.metadata_value("spec_id"),
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            status = error.status,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl RequestHooks for TracingObservabilityHooks {
    fn on_request_start(&self, operation: &str, request: &HttpRequest) {
        tracing::debug!(
            phase = "request",
            event = "start",
            operation,
            method = %request.method,
            host = request.url.host_str(),
            path = request.url.path(),
            has_body = request.body.is_some()
        );
    }

    fn on_request_success(
        &self,
        operation: &str,
        method: HttpMethod,
        status: u16,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "request",
            event = "success",
            operation,
            method = %method,
            status,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_request_failure(
        &self,
        operation: &str,
        method: HttpMethod,
        error: &OpenApiError,
        elapsed: Duration,
    ) {
        tracing::warn!(
            phase = "request",
            event = "failure",
            operation,
            method = %method,
            status = error.status,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.is_retryable(),
            error = %error
        );
    }
}

impl AgentHooks for TracingObservabilityHooks {
    fn on_turn_start(&self, agent_id: &str, model: &str, tool_count: usize) {
        tracing::info!(
            phase = "agent",
            event = "turn_start",
            agent_id,
            model,
            tool_count = tool_count as u64
        );
    }

    fn on_tool_round_trip(&self, agent_id: &str, round_trip: usize, tool_calls: usize) {
        tracing::debug!(
            phase = "agent",
            event = "tool_round_trip",
            agent_id,
            round_trip = round_trip as u64,
            tool_calls = tool_calls as u64
        );
    }

    fn on_turn_success(&self, agent_id: &str, result: &AgentTurnResult, elapsed: Duration) {
        tracing::info!(
            phase = "agent",
            event = "turn_success",
            agent_id,
            tool_round_trips = result.tool_round_trips as u64,
            tool_round_limit_reached = result.tool_round_limit_reached,
            stop_reason = ?result.stop_reason,
            total_tokens = result.usage.total_tokens,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_turn_failure(&self, agent_id: &str, error: &AgentError, elapsed: Duration) {
        tracing::error!(
            phase = "agent",
            event = "turn_failure",
            agent_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            error_phase = ?error.phase,
            retryable = error.is_retryable(),
            error = %error
        );
    }
}
