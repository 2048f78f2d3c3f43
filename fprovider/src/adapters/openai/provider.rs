//! OpenAI provider over a Chat Completions transport.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use serde_json::Value;

use crate::{
    BoxedEventStream, Message, ModelProvider, ModelRequest, ModelResponse, OutputItem,
    ProviderError, ProviderFuture, ProviderId, Role, StreamEvent, TokenUsage, ToolCall,
    ToolDefinition, ToolResult,
};

use super::transport::{OpenAiHttpTransport, OpenAiTransport};
use super::wire::{
    ChatChunk, ChatFunction, ChatFunctionCall, ChatMessage, ChatRequest, ChatResponse, ChatTool,
    ChatToolCall, StreamOptions, stop_reason,
};

#[derive(Clone)]
pub struct OpenAiProvider {
    api_key: String,
    transport: Arc<dyn OpenAiTransport>,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            api_key: api_key.into(),
            transport,
        }
    }

    pub fn over_http(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self::new(api_key, Arc::new(OpenAiHttpTransport::new(client)))
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::authentication("OpenAI API key is empty")
                .with_provider(ProviderId::OpenAi));
        }
        Ok(&self.api_key)
    }
}

impl Debug for OpenAiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"<redacted>")
            .field("transport", &self.transport)
            .finish()
    }
}

impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let api_key = self.api_key()?;
            let model = request.model.clone();
            let chat = build_chat_request(request, false)?;

            let response = self
                .transport
                .complete(chat, api_key)
                .await
                .map_err(|error| error.with_provider(ProviderId::OpenAi).with_model(&model))?;
            into_model_response(response)
        })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let api_key = self.api_key()?;
            let model = request.model.clone();
            let chat = build_chat_request(request, true)?;

            let mut chunks = self
                .transport
                .stream(chat, api_key)
                .await
                .map_err(|error| error.with_provider(ProviderId::OpenAi).with_model(&model))?;

            let stream = try_stream! {
                let mut accumulator = ChunkAccumulator::new(model);
                while let Some(chunk) = chunks.next().await {
                    for event in accumulator.absorb(chunk?) {
                        yield event;
                    }
                }
                for event in accumulator.finish() {
                    yield event;
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}

/// Tool calls already executed are replayed as one assistant turn ahead of their results.
pub(crate) fn build_chat_request(
    request: ModelRequest,
    stream: bool,
) -> Result<ChatRequest, ProviderError> {
    let mut messages: Vec<ChatMessage> =
        request.messages.into_iter().map(ChatMessage::from).collect();

    if !request.tool_calls.is_empty() {
        messages.push(ChatMessage {
            role: "assistant",
            content: None,
            tool_calls: request.tool_calls.into_iter().map(ChatToolCall::from).collect(),
            tool_call_id: None,
        });
    }
    messages.extend(request.tool_results.into_iter().map(ChatMessage::from));

    let tools = request
        .tools
        .into_iter()
        .map(ChatTool::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let max_tokens = request.options.max_tokens;
    let (max_tokens, max_completion_tokens) = if uses_completion_tokens(&request.model) {
        (None, max_tokens)
    } else {
        (max_tokens, None)
    };

    Ok(ChatRequest {
        model: request.model,
        messages,
        tools,
        temperature: request.options.temperature,
        max_tokens,
        max_completion_tokens,
        stream,
        stream_options: stream.then_some(StreamOptions {
            include_usage: true,
        }),
    })
}

/// Reasoning-era models reject `max_tokens`.
fn uses_completion_tokens(model: &str) -> bool {
    ["gpt-5", "o1", "o3", "o4"]
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

fn into_model_response(response: ChatResponse) -> Result<ModelResponse, ProviderError> {
    let choice = response.choices.into_iter().next().ok_or_else(|| {
        ProviderError::transport("OpenAI response did not include choices")
            .with_provider(ProviderId::OpenAi)
    })?;

    let mut output = Vec::new();
    if let Some(content) = choice.message.content.filter(|content| !content.is_empty()) {
        output.push(OutputItem::Message(Message::assistant(content)));
    }
    output.extend(choice.message.tool_calls.into_iter().map(|call| {
        OutputItem::ToolCall(ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
    }));

    Ok(ModelResponse {
        provider: ProviderId::OpenAi,
        model: response.model,
        output,
        stop_reason: stop_reason(choice.finish_reason.as_deref()),
        usage: response.usage.map(TokenUsage::from).unwrap_or_default(),
    })
}

/// Folds streamed chunks into deltas and, once the body ends, the full response.
#[derive(Debug)]
struct ChunkAccumulator {
    model: String,
    text: String,
    calls: BTreeMap<u32, ToolCall>,
    finish_reason: Option<String>,
    usage: TokenUsage,
}

impl ChunkAccumulator {
    fn new(model: String) -> Self {
        Self {
            model,
            text: String::new(),
            calls: BTreeMap::new(),
            finish_reason: None,
            usage: TokenUsage::default(),
        }
    }

    fn absorb(&mut self, chunk: ChatChunk) -> Vec<StreamEvent> {
        if let Some(model) = chunk.model.filter(|model| !model.is_empty()) {
            self.model = model;
        }
        if let Some(usage) = chunk.usage {
            self.usage = usage.into();
        }

        let mut events = Vec::new();
        let Some(choice) = chunk.choices.into_iter().next() else {
            return events;
        };

        if let Some(delta) = choice.delta.content.filter(|delta| !delta.is_empty()) {
            self.text.push_str(&delta);
            events.push(StreamEvent::TextDelta(delta));
        }

        for delta in choice.delta.tool_calls {
            let call = self
                .calls
                .entry(delta.index.unwrap_or(0))
                .or_insert_with(|| ToolCall {
                    id: String::new(),
                    name: String::new(),
                    arguments: String::new(),
                });
            if let Some(id) = delta.id {
                call.id = id;
            }
            if let Some(function) = delta.function {
                if let Some(name) = function.name {
                    call.name = name;
                }
                if let Some(arguments) = function.arguments {
                    call.arguments.push_str(&arguments);
                }
            }
            // Deltas are keyed by id downstream, so hold them until one arrives.
            if !call.id.is_empty() {
                events.push(StreamEvent::ToolCallDelta(call.clone()));
            }
        }

        if choice.finish_reason.is_some() {
            self.finish_reason = choice.finish_reason;
        }
        events
    }

    fn finish(self) -> Vec<StreamEvent> {
        let mut output = Vec::new();
        if !self.text.is_empty() {
            output.push(OutputItem::Message(Message::assistant(self.text.clone())));
        }
        output.extend(self.calls.into_iter().map(|(index, mut call)| {
            if call.id.is_empty() {
                call.id = format!("call_{index}");
            }
            OutputItem::ToolCall(call)
        }));

        vec![
            StreamEvent::MessageComplete(Message::assistant(self.text)),
            StreamEvent::ResponseComplete(ModelResponse {
                provider: ProviderId::OpenAi,
                model: self.model,
                output,
                stop_reason: stop_reason(self.finish_reason.as_deref()),
                usage: self.usage,
            }),
        ]
    }
}

impl From<Message> for ChatMessage {
    fn from(message: Message) -> Self {
        let role = match message.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        Self {
            role,
            content: Some(message.content),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

impl From<ToolResult> for ChatMessage {
    fn from(result: ToolResult) -> Self {
        Self {
            role: "tool",
            content: Some(result.output),
            tool_calls: Vec::new(),
            tool_call_id: Some(result.tool_call_id),
        }
    }
}

impl From<ToolCall> for ChatToolCall {
    fn from(call: ToolCall) -> Self {
        Self {
            id: call.id,
            kind: "function",
            function: ChatFunctionCall {
                name: call.name,
                arguments: call.arguments,
            },
        }
    }
}

impl TryFrom<ToolDefinition> for ChatTool {
    type Error = ProviderError;

    fn try_from(tool: ToolDefinition) -> Result<Self, Self::Error> {
        let parameters = serde_json::from_str::<Value>(&tool.input_schema).map_err(|error| {
            ProviderError::invalid_request(format!(
                "tool '{}' has an invalid input schema: {error}",
                tool.name
            ))
        })?;

        Ok(Self {
            kind: "function",
            function: ChatFunction {
                name: tool.name,
                description: tool.description,
                parameters,
            },
        })
    }
}
