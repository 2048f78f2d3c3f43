//! Agent-layer errors and classification.
//!
//! ```rust
//! use fagent::{AgentError, AgentErrorKind, AgentErrorPhase};
//! use ftooling::ToolError;
//!
//! let error = AgentError::from(ToolError::invalid_arguments("city: Required"));
//! assert_eq!(error.kind, AgentErrorKind::Tooling);
//! assert_eq!(error.phase, Some(AgentErrorPhase::Tooling));
//! assert!(error.is_user_error());
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use fprovider::{ProviderError, ProviderErrorKind};
use ftooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorKind {
    InvalidRequest,
    Provider,
    Tooling,
}

/// Step of a turn in which an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorPhase {
    Request,
    Routing,
    Streaming,
    Tooling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentError {
    pub kind: AgentErrorKind,
    pub phase: Option<AgentErrorPhase>,
    pub message: String,
    pub retryable: bool,
    user_error: bool,
}

impl AgentError {
    pub fn new(kind: AgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            phase: None,
            message: message.into(),
            retryable: false,
            user_error: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::InvalidRequest, message)
            .with_phase(AgentErrorPhase::Request)
            .with_user_error(true)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Provider, message)
    }

    pub fn tooling(message: impl Into<String>) -> Self {
        Self::new(AgentErrorKind::Tooling, message).with_phase(AgentErrorPhase::Tooling)
    }

    pub fn with_phase(mut self, phase: AgentErrorPhase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_user_error(mut self, user_error: bool) -> Self {
        self.user_error = user_error;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        self.user_error
    }
}

impl Display for AgentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for AgentError {}

impl From<ProviderError> for AgentError {
    fn from(value: ProviderError) -> Self {
        let user_error = matches!(
            value.kind,
            ProviderErrorKind::InvalidRequest | ProviderErrorKind::Authentication
        );

        AgentError::provider(value.to_string())
            .with_phase(AgentErrorPhase::Streaming)
            .with_retryable(value.retryable)
            .with_user_error(user_error)
    }
}

impl From<ToolError> for AgentError {
    fn from(value: ToolError) -> Self {
        AgentError::tooling(value.to_string())
            .with_retryable(value.is_retryable())
            .with_user_error(value.is_user_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_retry_classification() {
        let error = AgentError::from(ProviderError::rate_limited("slow down"));
        assert_eq!(error.kind, AgentErrorKind::Provider);
        assert_eq!(error.phase, Some(AgentErrorPhase::Streaming));
        assert!(error.is_retryable());
        assert!(!error.is_user_error());
    }

    #[test]
    fn unknown_models_are_user_errors() {
        let error = AgentError::from(ProviderError::unknown_model("gpt-2"));
        assert!(error.is_user_error());
        assert!(error.message.contains("Unknown model 'gpt-2'"));
    }

    #[test]
    fn tool_errors_carry_tool_context_in_message() {
        let error = AgentError::from(
            ToolError::upstream("HTTP 502: Bad Gateway")
                .with_status(502)
                .with_tool_name("getWeather"),
        );
        assert_eq!(error.kind, AgentErrorKind::Tooling);
        assert!(error.is_retryable());
        assert_eq!(
            error.to_string(),
            "Tooling: Upstream [tool=getWeather, status=502]: HTTP 502: Bad Gateway"
        );
    }
}
