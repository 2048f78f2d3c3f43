//! Tool contract and the closure-backed [`FunctionTool`].
//!
//! The runtime decodes a model's argument string before dispatch, so a tool
//! only ever sees a JSON object.
//!
//! ```rust
//! use fprovider::ToolDefinition;
//! use ftooling::{FunctionTool, Tool};
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition {
//!         name: "echo".to_string(),
//!         description: "Echoes input".to_string(),
//!         input_schema: r#"{"type":"object"}"#.to_string(),
//!     },
//!     |args, _ctx| async move { Ok(serde_json::Value::Object(args).to_string()) },
//! );
//!
//! assert_eq!(tool.definition().name, "echo");
//! assert_eq!(format!("{tool:?}"), r#"FunctionTool { name: "echo" }"#);
//! ```

use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;

use fcommon::BoxFuture;
use fprovider::ToolDefinition;
use serde_json::{Map, Value};

use crate::{ToolError, ToolExecutionContext};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

/// Decoded arguments of one tool call.
pub type ToolArgs = Map<String, Value>;

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    fn invoke<'a>(
        &'a self,
        args: ToolArgs,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>>;
}

type ToolHandler = dyn Fn(ToolArgs, ToolExecutionContext) -> ToolFuture<'static, Result<String, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(ToolArgs, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> = Arc::new(
            move |args: ToolArgs,
                  context: ToolExecutionContext|
                  -> ToolFuture<'static, Result<String, ToolError>> {
                Box::pin(handler(args, context))
            },
        );

        Self {
            definition,
            handler,
        }
    }
}

impl Debug for FunctionTool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.definition.name)
            .finish()
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn invoke<'a>(
        &'a self,
        args: ToolArgs,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        (self.handler)(args, context.clone())
    }
}
