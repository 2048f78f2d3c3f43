//! Metrics-based observability hooks for tool runtime, request, and agent phases.
//!
//! ```rust
//! use fagent::AgentHooks;
//! use fobserve::MetricsObservabilityHooks;
//!
//! fn accepts_agent_hooks(_hooks: &dyn AgentHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_agent_hooks(&hooks);
//! ```

use std::time::Duration;

use fagent::{AgentError, AgentHooks, AgentTurnResult};
use fopenapi::{HttpMethod, HttpRequest, OpenApiError, RequestHooks};
use fprovider::ToolCall;
use ftooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

/// Bounded label for an optional upstream status.
fn status_class(status: Option<u16>) -> &'static str {
    match status {
        Some(100..=199) => "1xx",
        Some(200..=299) => "2xx",
        Some(300..=399) => "3xx",
        Some(400..=499) => "4xx",
        Some(500..=599) => "5xx",
        Some(_) => "other",
        None => "none",
    }
}

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
        metrics::counter!(
            "specagent_tool_execution_start_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "specagent_tool_execution_success_total",
            "tool_name" => tool_call.name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "specagent_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "specagent_tool_execution_failure_total",
            "tool_name" => tool_call.name.clone(),
            "error_kind" => format!("{:?}", error.kind),
            "status_class" => status_class(error.status)
        )
        .increment(1);
        metrics::histogram!(
            "specagent_tool_execution_duration_seconds",
            "tool_name" => tool_call.name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl RequestHooks for MetricsObservabilityHooks {
    fn on_request_start(&self, operation: &str, request: &HttpRequest) {
        metrics::counter!(
            "specagent_request_start_total",
            "operation" => operation.to_string(),
            "method" => request.method.as_upper()
        )
        .increment(1);
    }

    fn on_request_success(
        &self,
        operation: &str,
        method: HttpMethod,
        status: u16,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "specagent_request_success_total",
            "operation" => operation.to_string(),
            "method" => method.as_upper(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "specagent_request_duration_seconds",
            "operation" => operation.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_request_failure(
        &self,
        operation: &str,
        method: HttpMethod,
        error: &OpenApiError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "specagent_request_failure_total",
            "operation" => operation.to_string(),
            "method" => method.as_upper(),
            "error_kind" => format!("{:?}", error.kind),
            "status_class" => status_class(error.status)
        )
        .increment(1);
        metrics::histogram!(
            "specagent_request_duration_seconds",
            "operation" => operation.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl AgentHooks for MetricsObservabilityHooks {
    fn on_turn_start(&self, agent_id: &str, model: &str, _tool_count: usize) {
        metrics::counter!(
            "specagent_agent_turn_start_total",
            "agent_id" => agent_id.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
    }

    fn on_tool_round_trip(&self, agent_id: &str, _round_trip: usize, tool_calls: usize) {
        metrics::counter!(
            "specagent_agent_tool_round_trip_total",
            "agent_id" => agent_id.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "specagent_agent_tool_calls_per_round_trip",
            "agent_id" => agent_id.to_string()
        )
        .record(tool_calls as f64);
    }

    fn on_turn_success(&self, agent_id: &str, result: &AgentTurnResult, elapsed: Duration) {
        metrics::counter!(
            "specagent_agent_turn_success_total",
            "agent_id" => agent_id.to_string(),
            "round_limit_reached" => result.tool_round_limit_reached.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "specagent_agent_turn_duration_seconds",
            "agent_id" => agent_id.to_string(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
        metrics::histogram!(
            "specagent_agent_turn_tokens",
            "agent_id" => agent_id.to_string()
        )
        .record(f64::from(result.usage.total_tokens));
    }

    fn on_turn_failure(&self, agent_id: &str, error: &AgentError, elapsed: Duration) {
        metrics::counter!(
            "specagent_agent_turn_failure_total",
            "agent_id" => agent_id.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "specagent_agent_turn_duration_seconds",
            "agent_id" => agent_id.to_string(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}
