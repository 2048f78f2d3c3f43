//! Rebuilds HTTP requests from validated tool arguments and performs them.
//!
//! ```rust
//! use fopenapi::{FieldLocation, HttpMethod, ParameterMapping, prepare_request};
//! use serde_json::json;
//!
//! let mut mapping = ParameterMapping::new();
//! mapping.insert("id", FieldLocation::Path);
//! mapping.insert("location", FieldLocation::Query);
//!
//! let args = json!({"id": "123", "location": "New York"});
//! let request = prepare_request(
//!     "https://api.example.com/v1",
//!     HttpMethod::Get,
//!     "/users/{id}",
//!     &mapping,
//!     args.as_object().expect("object"),
//! )
//! .expect("request should build");
//!
//! assert_eq!(
//!     request.url.as_str(),
//!     "https://api.example.com/v1/users/123?location=New%20York"
//! );
//! assert_eq!(request.body, None);
//! ```

use std::sync::Arc;
use std::time::Instant;

use fcommon::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::{Map, Value};

use crate::document::HttpMethod;
use crate::error::OpenApiError;
use crate::hooks::{NoopRequestHooks, RequestHooks};
use crate::synth::{FieldLocation, ParameterMapping};

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: body.into().into_bytes(),
        }
    }
}

/// Decoded response of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Json(Value),
    Text(String),
}

impl ResponsePayload {
    /// Text handed back to the model: JSON is serialized, text passes through.
    pub fn into_tool_output(self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text,
        }
    }
}

/// Performs one HTTP exchange. Implementations must not retry.
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, OpenApiError>>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(&'a self, request: HttpRequest) -> BoxFuture<'a, Result<HttpResponse, OpenApiError>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(reqwest_method(request.method), request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.to_string());
            }

            let response = builder.send().await.map_err(|error| {
                if error.is_timeout() {
                    OpenApiError::transport(format!("request timed out: {error}"))
                } else {
                    OpenApiError::transport(error.to_string())
                }
            })?;

            // The text is the canonical reason; the server's own phrase is not kept.
            let status = response.status();
            if !is_success_status(status.as_u16()) {
                return Err(OpenApiError::http(
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default(),
                ));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = response
                .bytes()
                .await
                .map_err(|error| OpenApiError::transport(error.to_string()))?;

            Ok(HttpResponse {
                status: status.as_u16(),
                content_type,
                body: body.to_vec(),
            })
        })
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// 2xx and 3xx count as success.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

fn status_text(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or_default()
}

/// Builds the outgoing request for one operation call.
///
/// Null values are skipped. Path values are percent-encoded before
/// substitution; query arrays repeat their key.
pub fn prepare_request(
    base_url: &str,
    method: HttpMethod,
    path: &str,
    mapping: &ParameterMapping,
    args: &Map<String, Value>,
) -> Result<HttpRequest, OpenApiError> {
    let mut path = path.to_string();
    let mut query = Vec::new();
    let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
    let mut cookies = Vec::new();
    let mut body = Map::new();

    for (name, value) in args {
        if value.is_null() {
            continue;
        }
        match mapping.location(name) {
            Some(FieldLocation::Path) => {
                let encoded = urlencoding::encode(&value_to_string(value)).into_owned();
                path = path.replace(&format!("{{{name}}}"), &encoded);
            }
            Some(FieldLocation::Query) => match value {
                Value::Array(items) => query.extend(
                    items
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(|item| (name.as_str(), value_to_string(item))),
                ),
                _ => query.push((name.as_str(), value_to_string(value))),
            },
            Some(FieldLocation::Header) => headers.push((name.clone(), value_to_string(value))),
            Some(FieldLocation::Cookie) => cookies.push(format!(
                "{name}={}",
                urlencoding::encode(&value_to_string(value))
            )),
            Some(FieldLocation::Body) => {
                body.insert(name.clone(), value.clone());
            }
            None => {}
        }
    }

    if !cookies.is_empty() {
        headers.push(("Cookie".to_string(), cookies.join("; ")));
    }

    let query = query
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    Ok(HttpRequest {
        method,
        url: resolve_url(base_url, &path, &query)?,
        headers,
        body: (method.allows_body() && !body.is_empty()).then_some(Value::Object(body)),
    })
}

/// Appends `path` to the base URL, keeping any base path prefix.
fn resolve_url(base_url: &str, path: &str, query: &str) -> Result<Url, OpenApiError> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Err(OpenApiError::transport(format!(
            "cannot resolve '{path}' without a base URL"
        )));
    }

    let joined = if path.is_empty() || path.starts_with('/') {
        format!("{}{path}", base_url.trim_end_matches('/'))
    } else {
        format!("{}/{path}", base_url.trim_end_matches('/'))
    };
    let mut url = Url::parse(&joined).map_err(|error| {
        OpenApiError::transport(format!("invalid request URL '{joined}': {error}"))
    })?;
    url.set_query((!query.is_empty()).then_some(query));
    Ok(url)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Decodes a successful response by its declared content type.
pub fn decode_response(response: HttpResponse) -> Result<ResponsePayload, OpenApiError> {
    if !is_success_status(response.status) {
        return Err(OpenApiError::http(
            response.status,
            status_text(response.status),
        ));
    }

    let is_json = response
        .content_type
        .as_deref()
        .is_some_and(|content_type| content_type.contains("application/json"));
    if is_json {
        return serde_json::from_slice(&response.body)
            .map(ResponsePayload::Json)
            .map_err(|error| OpenApiError::decode(format!("invalid JSON response: {error}")));
    }

    Ok(ResponsePayload::Text(
        String::from_utf8_lossy(&response.body).into_owned(),
    ))
}

/// Sends prepared requests through a transport and reports to hooks.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    hooks: Arc<dyn RequestHooks>,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl Default for RequestExecutor {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestTransport::default()))
    }
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            hooks: Arc::new(NoopRequestHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Executes `request` on behalf of `operation` (used only for hooks).
    pub async fn execute(
        &self,
        operation: &str,
        request: HttpRequest,
    ) -> Result<ResponsePayload, OpenApiError> {
        let method = request.method;
        let started = Instant::now();
        self.hooks.on_request_start(operation, &request);

        let outcome = match self.transport.send(request).await {
            Ok(response) => {
                let status = response.status;
                decode_response(response).map(|payload| (status, payload))
            }
            Err(error) => Err(error),
        };

        match outcome {
            Ok((status, payload)) => {
                self.hooks
                    .on_request_success(operation, method, status, started.elapsed());
                Ok(payload)
            }
            Err(error) => {
                self.hooks
                    .on_request_failure(operation, method, &error, started.elapsed());
                Err(error)
            }
        }
    }
}
