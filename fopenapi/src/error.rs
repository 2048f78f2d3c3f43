//! Errors raised while parsing specs, building schemas, and executing operations.
//!
//! ```rust
//! use fopenapi::{OpenApiError, OpenApiErrorKind};
//!
//! let error = OpenApiError::http(404, "Not Found");
//! assert_eq!(error.kind, OpenApiErrorKind::Http);
//! assert_eq!(error.status, Some(404));
//! assert_eq!(error.to_string(), "Http: HTTP 404: Not Found");
//! assert!(!error.is_retryable());
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use fcommon::SpecId;
use fstore::StoreError;
use ftooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenApiErrorKind {
    InvalidSpec,
    SpecNotFound,
    SchemaBuild,
    Http,
    Transport,
    Decode,
    InvalidArguments,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenApiError {
    pub kind: OpenApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
}

impl OpenApiError {
    pub fn new(kind: OpenApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            status_text: None,
        }
    }

    /// Joins every structural violation into one message.
    pub fn invalid_spec<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = violations
            .into_iter()
            .map(|violation| violation.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            OpenApiErrorKind::InvalidSpec,
            format!("Invalid OpenAPI spec: {joined}"),
        )
    }

    pub fn spec_not_found(id: &SpecId) -> Self {
        Self::new(
            OpenApiErrorKind::SpecNotFound,
            format!("spec '{id}' was not found"),
        )
    }

    pub fn schema_build(message: impl Into<String>) -> Self {
        Self::new(OpenApiErrorKind::SchemaBuild, message)
    }

    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        let status_text = status_text.into();
        Self {
            kind: OpenApiErrorKind::Http,
            message: format!("HTTP {status}: {status_text}"),
            status: Some(status),
            status_text: Some(status_text),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(OpenApiErrorKind::Transport, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(OpenApiErrorKind::Decode, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(OpenApiErrorKind::InvalidArguments, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(OpenApiErrorKind::Store, message)
    }

    pub fn is_retryable(&self) -> bool {
        match self.kind {
            OpenApiErrorKind::Transport => true,
            OpenApiErrorKind::Http => self
                .status
                .is_some_and(|status| status == 429 || status >= 500),
            _ => false,
        }
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            OpenApiErrorKind::InvalidSpec
                | OpenApiErrorKind::SpecNotFound
                | OpenApiErrorKind::InvalidArguments
        )
    }
}

impl Display for OpenApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for OpenApiError {}

impl From<StoreError> for OpenApiError {
    fn from(error: StoreError) -> Self {
        Self::store(error.to_string())
    }
}

impl From<OpenApiError> for ToolError {
    fn from(error: OpenApiError) -> Self {
        let retryable = error.is_retryable();
        let mapped = match error.kind {
            OpenApiErrorKind::InvalidArguments => ToolError::invalid_arguments(error.message),
            OpenApiErrorKind::Http if matches!(error.status, Some(401 | 403)) => {
                ToolError::unauthorized(error.message)
            }
            OpenApiErrorKind::Http | OpenApiErrorKind::Decode => ToolError::upstream(error.message),
            OpenApiErrorKind::Transport => ToolError::unreachable(error.message),
            OpenApiErrorKind::SpecNotFound => ToolError::not_found(error.message),
            OpenApiErrorKind::InvalidSpec
            | OpenApiErrorKind::SchemaBuild
            | OpenApiErrorKind::Store => ToolError::other(error.message),
        };

        match error.status {
            Some(status) => mapped.with_status(status),
            None => mapped,
        }
        .with_retryable(retryable)
    }
}

#[cfg(test)]
mod tests {
    use ftooling::{ToolError, ToolErrorKind};

    use super::*;

    #[test]
    fn invalid_spec_joins_violations() {
        let error = OpenApiError::invalid_spec(["#/info: is required", "#/paths: is required"]);
        assert_eq!(
            error.message,
            "Invalid OpenAPI spec: #/info: is required, #/paths: is required"
        );
        assert!(error.is_user_error());
    }

    #[test]
    fn retryable_covers_transport_throttling_and_server_errors() {
        assert!(OpenApiError::transport("connection reset").is_retryable());
        assert!(OpenApiError::http(429, "Too Many Requests").is_retryable());
        assert!(OpenApiError::http(503, "Service Unavailable").is_retryable());
        assert!(!OpenApiError::http(404, "Not Found").is_retryable());
        assert!(!OpenApiError::decode("bad json").is_retryable());
    }

    #[test]
    fn converts_into_tool_errors_by_kind() {
        let unauthorized = ToolError::from(OpenApiError::http(401, "Unauthorized"));
        assert_eq!(unauthorized.kind, ToolErrorKind::Unauthorized);
        assert_eq!(unauthorized.status, Some(401));

        let unavailable = ToolError::from(OpenApiError::http(503, "Service Unavailable"));
        assert_eq!(unavailable.kind, ToolErrorKind::Upstream);
        assert_eq!(unavailable.status, Some(503));
        assert!(unavailable.retryable);

        let timeout = ToolError::from(OpenApiError::http(408, "Request Timeout"));
        assert!(!timeout.retryable);

        let unreachable = ToolError::from(OpenApiError::transport("connection refused"));
        assert_eq!(unreachable.kind, ToolErrorKind::Unreachable);
        assert!(unreachable.retryable);
        assert_eq!(unavailable.message, "HTTP 503: Service Unavailable");

        let invalid = ToolError::from(OpenApiError::invalid_arguments("id: Required"));
        assert_eq!(invalid.kind, ToolErrorKind::InvalidArguments);
        assert!(!invalid.retryable);
    }

    #[test]
    fn store_errors_keep_their_classification_in_the_message() {
        let error = OpenApiError::from(StoreError::storage("disk full"));
        assert_eq!(error.kind, OpenApiErrorKind::Store);
        assert_eq!(error.message, "Storage: disk full");
    }
}
