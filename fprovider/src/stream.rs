//! Streaming event contracts and in-memory stream utilities.
//!
//! ```rust
//! use fprovider::{
//!     Message, ModelResponse, OutputItem, ProviderId, StopReason, StreamEvent, TokenUsage,
//!     VecEventStream,
//! };
//!
//! let response = ModelResponse {
//!     provider: ProviderId::OpenAi,
//!     model: "gpt-5-nano".to_string(),
//!     output: vec![OutputItem::Message(Message::assistant("hello"))],
//!     stop_reason: StopReason::EndTurn,
//!     usage: TokenUsage::default(),
//! };
//!
//! let stream = VecEventStream::replay(response);
//! assert_eq!(stream.len(), 2);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::{Message, ModelResponse, OutputItem, ProviderError, ToolCall};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    TextDelta(String),
    ToolCallDelta(ToolCall),
    MessageComplete(Message),
    ResponseComplete(ModelResponse),
}

/// Provider stream contract.
///
/// Invariants for consumers:
/// - Events are emitted in source order.
/// - `TextDelta` and `ToolCallDelta` may appear zero or more times; a later
///   `ToolCallDelta` with the same id supersedes an earlier one.
/// - `ResponseComplete` is the terminal milestone and carries the full output.
/// - Once the stream yields `None`, it must not yield additional items.
pub trait ModelEventStream: Stream<Item = Result<StreamEvent, ProviderError>> + Send {}

impl<T> ModelEventStream for T where T: Stream<Item = Result<StreamEvent, ProviderError>> + Send {}

pub type BoxedEventStream<'a> = Pin<Box<dyn ModelEventStream + 'a>>;

#[derive(Debug)]
pub struct VecEventStream {
    events: VecDeque<Result<StreamEvent, ProviderError>>,
}

impl VecEventStream {
    pub fn new(events: Vec<Result<StreamEvent, ProviderError>>) -> Self {
        Self {
            events: events.into(),
        }
    }

    /// Streams a finished response as one delta per output item followed by
    /// `ResponseComplete`.
    pub fn replay(response: ModelResponse) -> Self {
        let mut events = Vec::with_capacity(response.output.len() + 1);
        for item in &response.output {
            match item {
                OutputItem::Message(message) => {
                    events.push(Ok(StreamEvent::TextDelta(message.content.clone())))
                }
                OutputItem::ToolCall(call) => {
                    events.push(Ok(StreamEvent::ToolCallDelta(call.clone())))
                }
            }
        }
        events.push(Ok(StreamEvent::ResponseComplete(response)));
        Self::new(events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Stream for VecEventStream {
    type Item = Result<StreamEvent, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<StreamEvent, ProviderError>>> {
        Poll::Ready(self.events.pop_front())
    }
}
