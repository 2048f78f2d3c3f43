//! Tool dispatch and its lifecycle hooks.
//!
//! [`DefaultToolRuntime`] looks a call up by name, decodes its arguments, and
//! reports every attempt to [`ToolRuntimeHooks`], including calls that fail
//! before a tool runs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use fprovider::ToolCall;

use crate::{
    ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry,
    decode_arguments,
};

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;
}

/// Observers of tool calls; every callback defaults to a no-op.
pub trait ToolRuntimeHooks: Send + Sync {
    fn on_execution_start(&self, _tool_call: &ToolCall, _context: &ToolExecutionContext) {}

    fn on_execution_success(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        _elapsed: Duration,
    ) {
    }

    fn on_execution_failure(
        &self,
        _tool_call: &ToolCall,
        _context: &ToolExecutionContext,
        _error: &ToolError,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopToolRuntimeHooks;

impl ToolRuntimeHooks for NoopToolRuntimeHooks {}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    async fn dispatch(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let tool = self.registry.get(&tool_call.name).ok_or_else(|| {
            ToolError::not_found(format!("no tool named '{}'", tool_call.name))
        })?;
        let args = decode_arguments(&tool_call.arguments)?;

        let output = tool.invoke(args, context).await?;
        Ok(ToolExecutionResult::from_call(tool_call, output))
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            let outcome = self
                .dispatch(&tool_call, &context)
                .await
                .map_err(|error| {
                    error
                        .with_tool_name(tool_call.name.as_str())
                        .with_tool_call_id(tool_call.id.as_str())
                });

            match &outcome {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&tool_call, &context, result, started.elapsed())
                }
                Err(error) => {
                    self.hooks
                        .on_execution_failure(&tool_call, &context, error, started.elapsed())
                }
            }
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use fprovider::ToolDefinition;
    use serde_json::Value;

    use super::*;
    use crate::{ToolArgs, ToolErrorKind};

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} test tool"),
            input_schema: "{\"type\":\"object\"}".to_string(),
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(definition("getPet"), |args: ToolArgs, ctx| {
            Ok(format!(
                "session={} pet={}",
                ctx.session_id,
                args.get("petId").cloned().unwrap_or(Value::Null)
            ))
        });
        registry.register_sync_fn(definition("deletePet"), |_args, _ctx| {
            Err(ToolError::upstream("HTTP 500: Internal Server Error").with_status(500))
        });
        registry
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl RecordingHooks {
        fn push(&self, event: String) {
            self.events.lock().expect("events lock").push(event);
        }
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
            self.push(format!("start:{}", tool_call.name));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            _result: &ToolExecutionResult,
            _elapsed: Duration,
        ) {
            self.push(format!("success:{}", tool_call.name));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.push(format!("failure:{}:{:?}", tool_call.name, error.kind));
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn runtime_decodes_arguments_before_invoking() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let result = runtime
            .execute(
                call("call_1", "getPet", "{\"petId\":7}"),
                ToolExecutionContext::new("session-1"),
            )
            .await
            .expect("execution should succeed");

        assert_eq!(result.tool_call_id, "call_1");
        assert_eq!(result.tool_name, "getPet");
        assert_eq!(result.output, "session=session-1 pet=7");
    }

    #[tokio::test]
    async fn malformed_arguments_never_reach_the_tool() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let error = runtime
            .execute(
                call("call_2", "getPet", "{petId: 7}"),
                ToolExecutionContext::new("session-2"),
            )
            .await
            .expect_err("arguments should be rejected");

        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);
        assert_eq!(error.tool_call_id.as_deref(), Some("call_2"));
    }

    #[tokio::test]
    async fn runtime_tags_errors_with_tool_context() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let error = runtime
            .execute(
                call("call_3", "deletePet", "{}"),
                ToolExecutionContext::new("session-3"),
            )
            .await
            .expect_err("execution should fail");

        assert_eq!(error.kind, ToolErrorKind::Upstream);
        assert_eq!(error.status, Some(500));
        assert_eq!(error.tool_name.as_deref(), Some("deletePet"));
        assert_eq!(error.tool_call_id.as_deref(), Some("call_3"));
    }

    #[tokio::test]
    async fn runtime_reports_lifecycle_to_hooks() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(registry())).with_hooks(hooks.clone());
        let context = ToolExecutionContext::new("session-4");

        let _ = runtime.execute(call("a", "getPet", ""), context.clone()).await;
        let _ = runtime.execute(call("b", "deletePet", ""), context.clone()).await;
        let _ = runtime.execute(call("c", "listPets", ""), context.clone()).await;
        let _ = runtime.execute(call("d", "getPet", "[]"), context).await;

        let events = hooks.events.lock().expect("events lock");
        assert_eq!(
            *events,
            vec![
                "start:getPet",
                "success:getPet",
                "start:deletePet",
                "failure:deletePet:Upstream",
                "start:listPets",
                "failure:listPets:NotFound",
                "start:getPet",
                "failure:getPet:InvalidArguments",
            ]
        );
    }
}
