//! Turns OpenAPI 3.x documents into agent-callable tools.
//!
//! The pipeline validates a document, extracts one [`Operation`] per
//! method + path, synthesizes a flat argument schema per operation, and binds it
//! to an executor that rebuilds the HTTP request from validated arguments.
//!
//! ```rust
//! use fopenapi::{HttpMethod, ToolAssembler};
//! use serde_json::json;
//!
//! let document = json!({
//!     "openapi": "3.0.0",
//!     "info": {"title": "Users", "version": "1.0.0"},
//!     "servers": [{"url": "https://api.example.com"}],
//!     "paths": {
//!         "/users/{id}": {
//!             "get": {
//!                 "operationId": "getUser",
//!                 "responses": {"200": {"description": "OK"}},
//!                 "parameters": [{
//!                     "name": "id",
//!                     "in": "path",
//!                     "required": true,
//!                     "schema": {"type": "string"}
//!                 }]
//!             }
//!         }
//!     }
//! });
//!
//! let tools = ToolAssembler::default().assemble(&document).expect("tools should build");
//! let tool = tools.get("getUser").expect("tool should exist");
//! let request = tool.prepare(&json!({"id": "123"})).expect("arguments should validate");
//!
//! assert_eq!(request.method, HttpMethod::Get);
//! assert_eq!(request.url.as_str(), "https://api.example.com/users/123");
//! assert!(tool.prepare(&json!({})).is_err());
//! ```

mod assembler;
mod document;
mod error;
mod executor;
mod extract;
mod hooks;
mod schema;
mod service;
mod synth;
mod tool;
mod validate;

pub mod prelude {
    pub use crate::{
        FieldLocation, HttpMethod, HttpTransport, OpenApiError, OpenApiErrorKind, OpenApiTool,
        OpenApiTools, Operation, ParameterLocation, ParameterMapping, ParameterSchema,
        ParameterSpec, RequestExecutor, RequestHooks, ReqwestTransport, ResponsePayload,
        SchemaNode, SpecService, ToolAssembler, ToolSet, parse_operations, synthesize,
    };
}

pub use assembler::{ToolAssembler, ToolSet, tool_name};
pub use document::{HttpMethod, Operation, ParameterLocation, ParameterSpec};
pub use error::{OpenApiError, OpenApiErrorKind};
pub use executor::{
    HttpRequest, HttpResponse, HttpTransport, RequestExecutor, ReqwestTransport,
    ResponsePayload, decode_response, is_success_status, prepare_request,
};
pub use extract::{extract_operations, parse_operations};
pub use hooks::{NoopRequestHooks, RequestHooks};
pub use schema::{ObjectSchema, SchemaNode, SchemaViolation};
pub use service::{OpenApiTools, SpecService};
pub use synth::{FieldLocation, ParameterMapping, ParameterSchema, synthesize};
pub use tool::OpenApiTool;
pub use validate::validate_document;
