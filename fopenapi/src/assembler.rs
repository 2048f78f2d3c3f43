//! Builds the named tool set for a whole document.
//!
//! ```rust
//! use fopenapi::ToolAssembler;
//! use serde_json::json;
//!
//! let tools = ToolAssembler::default()
//!     .assemble(&json!({
//!         "openapi": "3.0.0",
//!         "info": {"title": "Weather", "version": "1.0.0"},
//!         "servers": [{"url": "https://api.weather.example"}],
//!         "paths": {
//!             "/weather": {
//!                 "get": {
//!                     "operationId": "getWeather",
//!                     "summary": "Get current weather",
//!                     "responses": {"200": {"description": "OK"}}
//!                 }
//!             }
//!         }
//!     }))
//!     .expect("tools should assemble");
//!
//! let tool = tools.get("getWeather").expect("tool should exist");
//! assert_eq!(tool.description(), "Get current weather");
//! assert_eq!(tool.base_url(), "https://api.weather.example");
//! ```

use std::sync::Arc;

use fcommon::Registry;
use fprovider::ToolDefinition;
use ftooling::{Tool, ToolRegistry};
use serde_json::Value;

use crate::document::Operation;
use crate::error::OpenApiError;
use crate::executor::RequestExecutor;
use crate::extract::parse_operations;
use crate::tool::OpenApiTool;

/// Ordered map of tool name to tool. Read-only once assembled.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Registry<String, Arc<OpenApiTool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tool`; an existing tool with the same name is replaced in place.
    pub fn insert(&mut self, tool: OpenApiTool) -> Option<Arc<OpenApiTool>> {
        self.tools.insert(tool.name().to_string(), Arc::new(tool))
    }

    pub fn get(&self, name: &str) -> Option<Arc<OpenApiTool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<OpenApiTool>> {
        self.tools.values()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn register_into(&self, registry: &mut ToolRegistry) {
        for tool in self.tools.values() {
            registry.register_shared(tool.clone());
        }
    }

    pub fn into_registry(self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        self.register_into(&mut registry);
        registry
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolAssembler {
    executor: RequestExecutor,
    base_url_override: Option<String>,
}

impl ToolAssembler {
    pub fn new(executor: RequestExecutor) -> Self {
        Self {
            executor,
            base_url_override: None,
        }
    }

    /// Base URL used when a document declares no servers.
    pub fn with_base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn base_url_for(&self, document: &Value) -> String {
        server_url(document)
            .or_else(|| self.base_url_override.clone())
            .unwrap_or_default()
    }

    pub fn assemble(&self, document: &Value) -> Result<ToolSet, OpenApiError> {
        let operations = parse_operations(document)?;
        self.assemble_operations(&self.base_url_for(document), operations)
    }

    /// Later operations sharing a name overwrite earlier ones.
    pub fn assemble_operations(
        &self,
        base_url: &str,
        operations: Vec<Operation>,
    ) -> Result<ToolSet, OpenApiError> {
        let mut tools = ToolSet::new();
        for operation in operations {
            let name = tool_name(&operation);
            let tool = OpenApiTool::new(name.clone(), base_url, operation, self.executor.clone())
                .map_err(|error| {
                    OpenApiError::new(
                        error.kind,
                        format!("failed to build tool '{name}': {}", error.message),
                    )
                })?;
            tools.insert(tool);
        }
        Ok(tools)
    }
}

/// `operationId`, or `{method}_{path}` with non-alphanumerics folded to `_`.
pub fn tool_name(operation: &Operation) -> String {
    if let Some(operation_id) = operation
        .operation_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
    {
        return operation_id.to_string();
    }

    let mut name = operation.method.as_str().to_string();
    let mut last_underscore = false;
    for character in format!("_{}", operation.path).chars() {
        if character.is_ascii_alphanumeric() {
            name.push(character);
            last_underscore = false;
        } else if !last_underscore {
            name.push('_');
            last_underscore = true;
        }
    }
    name.trim_end_matches('_').to_string()
}

/// First server URL with server variables replaced by their defaults.
fn server_url(document: &Value) -> Option<String> {
    let server = document.get("servers")?.as_array()?.first()?;
    let mut url = server.get("url")?.as_str()?.to_string();
    if let Some(variables) = server.get("variables").and_then(Value::as_object) {
        for (name, variable) in variables {
            if let Some(default) = variable.get("default").and_then(Value::as_str) {
                url = url.replace(&format!("{{{name}}}"), default);
            }
        }
    }
    (!url.is_empty()).then_some(url)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::document::HttpMethod;
    use crate::OpenApiErrorKind;

    fn ok() -> Value {
        json!({"200": {"description": "OK"}})
    }

    fn spec(servers: Value, paths: Value) -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1.0.0"},
            "servers": servers,
            "paths": paths
        })
    }

    #[test]
    fn tools_are_keyed_by_operation_id_in_document_order() {
        let tools = ToolAssembler::default()
            .assemble(&spec(
                json!([{"url": "https://api.example.com"}]),
                json!({
                    "/users": {
                        "post": {"operationId": "createUser", "responses": ok()},
                        "get": {"operationId": "listUsers", "responses": ok()}
                    },
                    "/users/{id}": {
                        "get": {
                            "operationId": "getUser",
                            "responses": ok(),
                            "parameters": [{
                                "name": "id",
                                "in": "path",
                                "required": true,
                                "schema": {"type": "string"}
                            }]
                        }
                    }
                }),
            ))
            .expect("tools should assemble");

        assert_eq!(tools.names(), vec!["listUsers", "createUser", "getUser"]);
        assert_eq!(tools.definitions().len(), 3);
    }

    #[test]
    fn empty_paths_yield_an_empty_tool_set() {
        let tools = ToolAssembler::default()
            .assemble(&spec(json!([]), json!({})))
            .expect("tools should assemble");
        assert!(tools.is_empty());
    }

    #[test]
    fn duplicate_operation_ids_keep_the_last_tool_at_the_first_position() {
        let tools = ToolAssembler::default()
            .assemble(&spec(
                json!([]),
                json!({
                    "/a": {"get": {"operationId": "dup", "summary": "first", "responses": ok()}},
                    "/b": {"get": {"operationId": "other", "responses": ok()}},
                    "/c": {"get": {"operationId": "dup", "summary": "last", "responses": ok()}}
                }),
            ))
            .expect("tools should assemble");

        assert_eq!(tools.names(), vec!["dup", "other"]);
        let dup = tools.get("dup").expect("dup should exist");
        assert_eq!(dup.description(), "last");
        assert_eq!(dup.operation().path, "/c");
    }

    #[test]
    fn base_url_comes_from_servers_then_override() {
        let with_variables = spec(
            json!([
                {
                    "url": "https://{region}.example.com/{version}",
                    "variables": {
                        "region": {"default": "eu"},
                        "version": {"default": "v2"}
                    }
                },
                {"url": "https://fallback.example.com"}
            ]),
            json!({}),
        );
        let assembler = ToolAssembler::default().with_base_url_override("https://override.example");

        assert_eq!(
            assembler.base_url_for(&with_variables),
            "https://eu.example.com/v2"
        );
        assert_eq!(
            assembler.base_url_for(&spec(json!([]), json!({}))),
            "https://override.example"
        );
        assert_eq!(
            ToolAssembler::default().base_url_for(&spec(json!([]), json!({}))),
            ""
        );
    }

    #[test]
    fn missing_operation_ids_get_derived_names() {
        let operation = Operation::new(HttpMethod::Get, "/users/{id}/posts");
        assert_eq!(tool_name(&operation), "get_users_id_posts");
        let blank = Operation::new(HttpMethod::Delete, "/").with_operation_id(" ");
        assert_eq!(tool_name(&blank), "delete");
    }

    #[test]
    fn schema_failures_name_the_tool() {
        // 3.1 leaves schema objects to the JSON Schema dialect, so this
        // passes document validation and fails while building the tool.
        let error = ToolAssembler::default()
            .assemble(&json!({
                "openapi": "3.1.0",
                "info": {"title": "Test", "version": "1.0.0"},
                "paths": {
                    "/search": {
                        "get": {
                            "operationId": "search",
                            "parameters": [
                                {"name": "limit", "in": "query", "schema": {"type": "int"}}
                            ]
                        }
                    }
                }
            }))
            .expect_err("bad schema should fail");

        assert_eq!(error.kind, OpenApiErrorKind::SchemaBuild);
        assert_eq!(
            error.message,
            "failed to build tool 'search': limit: unsupported schema type 'int'"
        );
    }

    #[test]
    fn tool_sets_register_into_tool_registries() {
        let tools = ToolAssembler::default()
            .assemble(&spec(
                json!([]),
                json!({"/a": {"get": {"operationId": "a", "responses": ok()}}}),
            ))
            .expect("tools should assemble");
        let registry = tools.into_registry();
        assert!(registry.contains("a"));
        assert_eq!(registry.len(), 1);
    }
}
