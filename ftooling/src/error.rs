//! Failures of a single tool call.
//!
//! Tools in this workspace front remote HTTP operations, so an error keeps the
//! upstream status when there was one. [`ToolError::to_model_output`] is the
//! payload a model sees in place of the tool's answer.
//!
//! ```rust
//! use ftooling::ToolError;
//!
//! let error = ToolError::upstream("HTTP 404: Not Found")
//!     .with_status(404)
//!     .with_tool_name("getUser");
//! assert_eq!(error.to_string(), "Upstream [tool=getUser, status=404]: HTTP 404: Not Found");
//! assert!(error.to_model_output().contains("\"status\":404"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// No tool with the requested name is registered.
    NotFound,
    InvalidArguments,
    /// The remote API answered with a failure or an unreadable body.
    Upstream,
    /// The remote API could not be reached.
    Unreachable,
    Unauthorized,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    pub retryable: bool,
    pub status: Option<u16>,
    pub tool_name: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolError {
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: matches!(kind, ToolErrorKind::Unreachable),
            status: None,
            tool_name: None,
            tool_call_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NotFound, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Upstream, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Unreachable, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Unauthorized, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::Other, message)
    }

    /// Records the upstream HTTP status. 408, 429, and 5xx become retryable.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self.retryable = self.retryable || matches!(status, 408 | 429 | 500..=599);
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Self {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self.kind,
            ToolErrorKind::InvalidArguments | ToolErrorKind::NotFound | ToolErrorKind::Unauthorized
        )
    }

    /// JSON object handed back to a model when a tool call fails.
    pub fn to_model_output(&self) -> String {
        let mut output = Map::new();
        output.insert("error".to_string(), Value::from(self.message.as_str()));
        output.insert("kind".to_string(), Value::from(format!("{:?}", self.kind)));
        output.insert("retryable".to_string(), Value::from(self.retryable));
        if let Some(status) = self.status {
            output.insert("status".to_string(), Value::from(status));
        }

        Value::Object(output).to_string()
    }
}

impl Display for ToolError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut context = Vec::new();
        if let Some(tool_name) = &self.tool_name {
            context.push(format!("tool={tool_name}"));
        }
        if let Some(tool_call_id) = &self.tool_call_id {
            context.push(format!("call_id={tool_call_id}"));
        }
        if let Some(status) = self.status {
            context.push(format!("status={status}"));
        }

        if context.is_empty() {
            write!(f, "{:?}: {}", self.kind, self.message)
        } else {
            write!(f, "{:?} [{}]: {}", self.kind, context.join(", "), self.message)
        }
    }
}

impl Error for ToolError {}
