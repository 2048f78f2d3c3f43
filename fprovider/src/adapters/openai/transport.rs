//! Chat Completions transport trait and its reqwest implementation.

use std::fmt::Debug;
use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture};

use super::wire::{ChatChunk, ChatRequest, ChatResponse, error_message};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub type ChatChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ChatChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiTransport: Send + Sync + Debug {
    fn complete<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<ChatChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, request: &ChatRequest, api_key: &str) -> Result<Response, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<ChatResponse, ProviderError>> {
        Box::pin(async move {
            let response = self.send(&request, api_key).await?;
            response
                .json::<ChatResponse>()
                .await
                .map_err(|error| ProviderError::transport(format!("invalid OpenAI response: {error}")))
        })
    }

    fn stream<'a>(
        &'a self,
        request: ChatRequest,
        api_key: &'a str,
    ) -> ProviderFuture<'a, Result<ChatChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            let response = self.send(&request, api_key).await?;

            let stream = try_stream! {
                let mut bytes = response.bytes_stream();
                let mut lines = SseLines::default();

                'read: while let Some(item) = bytes.next().await {
                    let item = item.map_err(send_error)?;
                    for data in lines.feed(&item)? {
                        let SseData::Payload(payload) = data else {
                            break 'read;
                        };
                        let chunk = serde_json::from_str::<ChatChunk>(&payload).map_err(|error| {
                            ProviderError::transport(format!("invalid OpenAI stream chunk: {error}"))
                        })?;
                        yield chunk;
                    }
                }
            };

            Ok(Box::pin(stream) as ChatChunkStream<'a>)
        })
    }
}

fn send_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(error.to_string())
    } else {
        ProviderError::transport(error.to_string())
    }
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let message = error_message(body)
        .unwrap_or_else(|| format!("OpenAI request failed with status {status}"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::timeout(message)
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(message)
        }
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
            ProviderError::unavailable(message)
        }
        _ => ProviderError::transport(message),
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseData {
    Payload(String),
    Done,
}

/// Splits a server-sent event body into `data:` payloads across chunk boundaries.
#[derive(Debug, Default)]
pub(crate) struct SseLines {
    pending: Vec<u8>,
}

impl SseLines {
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SseData>, ProviderError> {
        self.pending.extend_from_slice(bytes);

        let mut data = Vec::new();
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=newline).collect();
            let line = std::str::from_utf8(&line)
                .map_err(|error| ProviderError::transport(error.to_string()))?;

            let Some(payload) = line.trim().strip_prefix("data:") else {
                continue;
            };
            let payload = payload.trim();
            if payload == "[DONE]" {
                data.push(SseData::Done);
                break;
            }
            if !payload.is_empty() {
                data.push(SseData::Payload(payload.to_string()));
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn sse_payloads_survive_chunk_boundaries() {
        let mut lines = SseLines::default();

        assert!(lines.feed(b"data: {\"a\":").expect("partial line").is_empty());
        assert_eq!(
            lines.feed(b"1}\n\n: keep-alive\ndata: {\"b\":2}\n").expect("lines"),
            vec![
                SseData::Payload("{\"a\":1}".to_string()),
                SseData::Payload("{\"b\":2}".to_string()),
            ]
        );
        assert_eq!(
            lines.feed(b"data: [DONE]\n\n").expect("done"),
            vec![SseData::Done]
        );
    }

    #[test]
    fn multibyte_characters_split_across_chunks_are_kept() {
        let mut lines = SseLines::default();
        let body = "data: {\"content\":\"caf\u{e9}\"}\n".as_bytes();
        let split = body.len() - 4;

        assert!(lines.feed(&body[..split]).expect("first half").is_empty());
        assert_eq!(
            lines.feed(&body[split..]).expect("second half"),
            vec![SseData::Payload("{\"content\":\"caf\u{e9}\"}".to_string())]
        );
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        let error = status_error(StatusCode::UNAUTHORIZED, body);
        assert_eq!(error.kind, ProviderErrorKind::Authentication);
        assert_eq!(error.message, "Incorrect API key provided");

        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "").kind,
            ProviderErrorKind::RateLimited
        );
        assert_eq!(
            status_error(StatusCode::BAD_REQUEST, "").kind,
            ProviderErrorKind::InvalidRequest
        );
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "").kind,
            ProviderErrorKind::Unavailable
        );

        let fallback = status_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>");
        assert_eq!(fallback.kind, ProviderErrorKind::Transport);
        assert_eq!(
            fallback.message,
            "OpenAI request failed with status 500 Internal Server Error"
        );
    }
}
