//! Tool contracts, registry, and dispatch runtime for agent function calling.
//!
//! A model names a tool and sends its arguments as a JSON string; the
//! [`DefaultToolRuntime`] decodes them into [`ToolArgs`] and invokes the tool
//! registered under that name.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use fprovider::ToolDefinition;
//! use ftooling::{DefaultToolRuntime, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry.register_sync_fn(
//!     ToolDefinition {
//!         name: "getPet".to_string(),
//!         description: "Find a pet by id".to_string(),
//!         input_schema: r#"{"type":"object","properties":{"petId":{"type":"integer"}}}"#
//!             .to_string(),
//!     },
//!     |args, _ctx| Ok(format!("pet {}", args["petId"])),
//! );
//!
//! let runtime = DefaultToolRuntime::new(Arc::new(registry));
//! assert_eq!(runtime.registry().names(), vec!["getPet"]);
//! ```

mod args;
mod error;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, FunctionTool, NoopToolRuntimeHooks, Tool, ToolArgs, ToolError,
        ToolErrorKind, ToolExecutionContext, ToolExecutionResult, ToolFuture, ToolRegistry,
        ToolRuntime, ToolRuntimeHooks,
    };
}

pub use args::decode_arguments;
pub use error::{ToolError, ToolErrorKind};
pub use registry::ToolRegistry;
pub use runtime::{DefaultToolRuntime, NoopToolRuntimeHooks, ToolRuntime, ToolRuntimeHooks};
pub use tool::{FunctionTool, Tool, ToolArgs, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult};
