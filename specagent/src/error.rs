//! Facade error wrapping the layer errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

use fagent::AgentError;
use fopenapi::{OpenApiError, OpenApiErrorKind};
use fstore::StoreError;

use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecAgentErrorKind {
    Config,
    Store,
    SpecNotFound,
    OpenApi,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAgentError {
    pub kind: SpecAgentErrorKind,
    pub message: String,
    user_error: bool,
}

impl SpecAgentError {
    pub fn new(kind: SpecAgentErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            user_error: false,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(SpecAgentErrorKind::Config, message).with_user_error(true)
    }

    pub fn with_user_error(mut self, user_error: bool) -> Self {
        self.user_error = user_error;
        self
    }

    pub fn is_user_error(&self) -> bool {
        self.user_error
    }
}

impl Display for SpecAgentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SpecAgentError {}

impl From<ConfigError> for SpecAgentError {
    fn from(value: ConfigError) -> Self {
        SpecAgentError::config(value.to_string())
    }
}

impl From<StoreError> for SpecAgentError {
    fn from(value: StoreError) -> Self {
        SpecAgentError::new(SpecAgentErrorKind::Store, value.to_string())
    }
}

impl From<OpenApiError> for SpecAgentError {
    fn from(value: OpenApiError) -> Self {
        let kind = match value.kind {
            OpenApiErrorKind::SpecNotFound => SpecAgentErrorKind::SpecNotFound,
            OpenApiErrorKind::Store => SpecAgentErrorKind::Store,
            _ => SpecAgentErrorKind::OpenApi,
        };

        SpecAgentError::new(kind, value.to_string()).with_user_error(value.is_user_error())
    }
}

impl From<AgentError> for SpecAgentError {
    fn from(value: AgentError) -> Self {
        let user_error = value.is_user_error();
        SpecAgentError::new(SpecAgentErrorKind::Agent, value.to_string()).with_user_error(user_error)
    }
}
