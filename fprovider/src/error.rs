//! Errors raised while routing to or talking with a model provider.
//!
//! Retryability follows from the kind: throttling, timeouts, transport
//! failures, and outages are worth another attempt.
//!
//! ```rust
//! use fprovider::{ProviderError, ProviderErrorKind, ProviderId};
//!
//! let unknown = ProviderError::unknown_model("gpt-2");
//! assert_eq!(unknown.kind, ProviderErrorKind::InvalidRequest);
//! assert_eq!(unknown.to_string(), "InvalidRequest [model=gpt-2]: Unknown model 'gpt-2'");
//!
//! let timeout = ProviderError::timeout("upstream timeout").with_provider(ProviderId::OpenAi);
//! assert!(timeout.is_retryable());
//! assert_eq!(timeout.to_string(), "Timeout [provider=openai]: upstream timeout");
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::ProviderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Other,
}

impl ProviderErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Transport | Self::Unavailable
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
    pub provider: Option<ProviderId>,
    pub model: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: kind.is_retryable(),
            provider: None,
            model: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    /// The model name is not in the routing catalog.
    pub fn unknown_model(model: &str) -> Self {
        Self::invalid_request(format!("Unknown model '{model}'")).with_model(model)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message)
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let context = match (self.provider, &self.model) {
            (Some(provider), Some(model)) => format!(" [provider={provider}, model={model}]"),
            (Some(provider), None) => format!(" [provider={provider}]"),
            (None, Some(model)) => format!(" [model={model}]"),
            (None, None) => String::new(),
        };

        write!(f, "{:?}{context}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_follows_kind_unless_overridden() {
        assert!(ProviderError::rate_limited("slow down").is_retryable());
        assert!(!ProviderError::authentication("bad key").is_retryable());
        assert!(!ProviderError::unavailable("down").with_retryable(false).is_retryable());
    }

    #[test]
    fn display_names_provider_and_model() {
        let error = ProviderError::unavailable("no provider registered")
            .with_provider(ProviderId::Google)
            .with_model("gemini-2.5-pro");

        assert_eq!(
            error.to_string(),
            "Unavailable [provider=google, model=gemini-2.5-pro]: no provider registered"
        );
    }
}
