//! Chat agent turn orchestration with tool round trips.

use std::sync::Arc;
use std::time::Instant;

use async_stream::try_stream;
use fcommon::{GenerationOptions, MetadataMap, Registry};
use fprovider::{
    Message, ModelProvider, ModelRequest, ModelRouter, ProviderError, Role, StopReason,
    StreamEvent, TokenUsage, ToolCall, ToolDefinition, ToolResult,
};
use ftooling::{
    DefaultToolRuntime, NoopToolRuntimeHooks, ToolExecutionContext, ToolRuntime,
    ToolRuntimeHooks,
};
use futures_util::StreamExt;

use crate::{
    AgentError, AgentErrorPhase, AgentEvent, AgentEventStream, AgentHooks, AgentRequest,
    AgentTurnResult, NoopAgentHooks,
};

pub const DEFAULT_MAX_TOOL_ROUND_TRIPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentPolicy {
    /// Tool execution rounds allowed per turn; zero disables tool execution.
    pub max_tool_round_trips: usize,
    /// Abort the turn on the first failed tool call instead of reporting the
    /// failure to the model.
    pub fail_on_tool_error: bool,
}

impl Default for AgentPolicy {
    fn default() -> Self {
        Self {
            max_tool_round_trips: DEFAULT_MAX_TOOL_ROUND_TRIPS,
            fail_on_tool_error: false,
        }
    }
}

impl AgentPolicy {
    pub fn with_max_tool_round_trips(mut self, max_tool_round_trips: usize) -> Self {
        self.max_tool_round_trips = max_tool_round_trips;
        self
    }

    pub fn with_fail_on_tool_error(mut self, fail_on_tool_error: bool) -> Self {
        self.fail_on_tool_error = fail_on_tool_error;
        self
    }
}

#[derive(Clone)]
pub struct ChatAgent {
    router: ModelRouter,
    policy: AgentPolicy,
    hooks: Arc<dyn AgentHooks>,
    tool_hooks: Arc<dyn ToolRuntimeHooks>,
}

impl ChatAgent {
    pub fn new(router: ModelRouter) -> Self {
        Self {
            router,
            policy: AgentPolicy::default(),
            hooks: Arc::new(NoopAgentHooks),
            tool_hooks: Arc::new(NoopToolRuntimeHooks),
        }
    }

    pub fn with_policy(mut self, policy: AgentPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn AgentHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Hooks handed to the tool runtime created for each turn.
    pub fn with_tool_hooks(mut self, tool_hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.tool_hooks = tool_hooks;
        self
    }

    pub fn policy(&self) -> AgentPolicy {
        self.policy
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }

    /// Runs a turn to completion and returns its final result.
    pub async fn run(&self, request: AgentRequest) -> Result<AgentTurnResult, AgentError> {
        let mut stream = self.stream(request).await?;
        let mut finished = None;

        while let Some(event) = stream.next().await {
            if let AgentEvent::Finished(result) = event? {
                finished = Some(result);
            }
        }

        finished.ok_or_else(|| {
            AgentError::provider("agent stream ended without a final result")
                .with_phase(AgentErrorPhase::Streaming)
        })
    }

    /// Streams a turn. Request and routing errors are returned before any
    /// event is produced; provider and tool errors end the stream.
    pub async fn stream<'a>(
        &'a self,
        request: AgentRequest,
    ) -> Result<AgentEventStream<'a>, AgentError> {
        let started = Instant::now();
        let agent_id = request.agent.id.clone();

        let turn = match self.prepare(request) {
            Ok(turn) => turn,
            Err(error) => {
                self.hooks
                    .on_turn_failure(&agent_id, &error, started.elapsed());
                return Err(error);
            }
        };

        self.hooks
            .on_turn_start(&turn.agent_id, &turn.model, turn.tools.len());

        let policy = self.policy;
        let round_hooks = Arc::clone(&self.hooks);
        let turn_hooks = Arc::clone(&self.hooks);

        let inner = try_stream! {
            let PreparedTurn {
                agent_id,
                model,
                provider,
                mut messages,
                tools,
                runtime,
                context,
                options,
                metadata,
            } = turn;

            let mut tool_results = Vec::<ToolResult>::new();
            let mut requested = Vec::<ToolCall>::new();
            let mut usage = TokenUsage::default();
            let mut round_trips = 0_usize;

            loop {
                let model_request = build_request(
                    &model,
                    &messages,
                    &tools,
                    &requested,
                    &tool_results,
                    options,
                    &metadata,
                )?;
                let mut events = provider.stream(model_request).await?;

                let mut text = String::new();
                let mut calls = Registry::<String, ToolCall>::new();
                let mut stop_reason = StopReason::Other;

                while let Some(event) = events.next().await {
                    match event? {
                        StreamEvent::TextDelta(delta) => {
                            text.push_str(&delta);
                            yield AgentEvent::TextDelta(delta);
                        }
                        StreamEvent::ToolCallDelta(call) => {
                            calls.insert(call.id.clone(), call);
                        }
                        StreamEvent::MessageComplete(message) => {
                            if message.role == Role::Assistant && text.is_empty() {
                                text = message.content;
                            }
                        }
                        StreamEvent::ResponseComplete(response) => {
                            let content = response.text();
                            if !content.is_empty() {
                                text = content;
                            }

                            for call in response.tool_calls() {
                                calls.insert(call.id.clone(), call);
                            }

                            usage.add(response.usage);
                            stop_reason = response.stop_reason;
                        }
                    }
                }

                let calls: Vec<ToolCall> = calls.values().cloned().collect();
                if !text.is_empty() {
                    messages.push(Message::assistant(text.clone()));
                }

                for call in &calls {
                    requested.push(call.clone());
                    yield AgentEvent::ToolCallRequested(call.clone());
                }

                let runtime = match &runtime {
                    Some(runtime) if !calls.is_empty() && round_trips < policy.max_tool_round_trips => {
                        runtime
                    }
                    _ => {
                        let tool_round_limit_reached = !calls.is_empty() && runtime.is_some();
                        yield AgentEvent::Finished(AgentTurnResult {
                            agent_id,
                            assistant_message: text,
                            tool_calls: requested,
                            tool_round_trips: round_trips,
                            tool_round_limit_reached,
                            stop_reason,
                            usage,
                        });
                        break;
                    }
                };

                round_trips += 1;
                round_hooks.on_tool_round_trip(&agent_id, round_trips, calls.len());

                for call in calls {
                    match runtime.execute(call.clone(), context.clone()).await {
                        Ok(result) => {
                            tool_results.push(result.clone().into_tool_result());
                            yield AgentEvent::ToolResult(result);
                        }
                        Err(error) => {
                            let output = error.to_model_output();
                            if policy.fail_on_tool_error {
                                Err::<(), AgentError>(AgentError::from(error))?;
                            }

                            tool_results.push(ToolResult::failure(call.id.clone(), output.clone()));
                            yield AgentEvent::ToolFailed { tool_call: call, output };
                        }
                    }
                }
            }
        };

        let observed = inner.inspect(move |item: &Result<AgentEvent, AgentError>| match item {
            Ok(AgentEvent::Finished(result)) => {
                turn_hooks.on_turn_success(&agent_id, result, started.elapsed())
            }
            Err(error) => turn_hooks.on_turn_failure(&agent_id, error, started.elapsed()),
            Ok(_) => {}
        });

        Ok(Box::pin(observed))
    }

    fn prepare(&self, request: AgentRequest) -> Result<PreparedTurn, AgentError> {
        let AgentRequest {
            agent,
            messages: history,
            tools: registry,
            session_id,
            options,
            metadata,
        } = request;

        if history.is_empty() {
            return Err(AgentError::invalid_request("messages must not be empty"));
        }

        if agent.model.trim().is_empty() {
            return Err(AgentError::invalid_request("agent model must not be empty"));
        }

        let provider = self
            .router
            .resolve(&agent.model)
            .map_err(|error| AgentError::from(error).with_phase(AgentErrorPhase::Routing))?;

        let mut messages = Vec::with_capacity(history.len() + 1);
        if !agent.system_prompt.trim().is_empty() {
            messages.push(Message::system(agent.system_prompt.clone()));
        }
        messages.extend(history);

        let registry = registry.filter(|registry| !registry.is_empty());
        let tools = registry
            .as_ref()
            .map(|registry| registry.definitions())
            .unwrap_or_default();
        let runtime = registry.map(|registry| {
            DefaultToolRuntime::new(registry).with_hooks(Arc::clone(&self.tool_hooks))
        });

        let mut context =
            ToolExecutionContext::new(session_id).with_metadata("agent_id", agent.id.clone());
        for (key, value) in &metadata {
            context = context.with_metadata(key.clone(), value.clone());
        }

        Ok(PreparedTurn {
            agent_id: agent.id,
            model: agent.model,
            provider,
            messages,
            tools,
            runtime,
            context,
            options,
            metadata,
        })
    }
}

struct PreparedTurn {
    agent_id: String,
    model: String,
    provider: Arc<dyn ModelProvider>,
    messages: Vec<Message>,
    tools: Vec<ToolDefinition>,
    runtime: Option<DefaultToolRuntime>,
    context: ToolExecutionContext,
    options: GenerationOptions,
    metadata: MetadataMap,
}

fn build_request(
    model: &str,
    messages: &[Message],
    tools: &[ToolDefinition],
    tool_calls: &[ToolCall],
    tool_results: &[ToolResult],
    options: GenerationOptions,
    metadata: &MetadataMap,
) -> Result<ModelRequest, AgentError> {
    let mut builder = ModelRequest::builder(model)
        .messages(messages.iter().cloned())
        .options(options)
        .enable_streaming()
        .tools(tools.to_vec())
        .tool_calls(tool_calls.to_vec())
        .tool_results(tool_results.to_vec());

    for (key, value) in metadata {
        builder = builder.metadata(key.clone(), value.clone());
    }

    builder
        .build()
        .map_err(|error: ProviderError| AgentError::from(error).with_phase(AgentErrorPhase::Request))
}
