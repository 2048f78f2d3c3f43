//! A single OpenAPI operation exposed as an agent tool.

use fprovider::ToolDefinition;
use ftooling::{Tool, ToolArgs, ToolError, ToolExecutionContext, ToolFuture};
use serde_json::{Map, Value};

use crate::document::Operation;
use crate::error::OpenApiError;
use crate::executor::{HttpRequest, RequestExecutor, ResponsePayload, prepare_request};
use crate::synth::{ParameterSchema, synthesize};

/// Binds one operation's synthesized schema to the executor.
///
/// Tools hold no mutable state; concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct OpenApiTool {
    name: String,
    base_url: String,
    operation: Operation,
    schema: ParameterSchema,
    executor: RequestExecutor,
}

impl OpenApiTool {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        operation: Operation,
        executor: RequestExecutor,
    ) -> Result<Self, OpenApiError> {
        let schema = synthesize(&operation)?;
        Ok(Self {
            name: name.into(),
            base_url: base_url.into(),
            operation,
            schema,
            executor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        self.operation.tool_description()
    }

    pub fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks `args` against the parameter schema, dropping undeclared keys.
    pub fn validate(&self, args: &Value) -> Result<Map<String, Value>, OpenApiError> {
        match self.schema.node.parse(args) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(_) => Err(OpenApiError::invalid_arguments(
                "arguments must be a JSON object",
            )),
            Err(violations) => Err(OpenApiError::invalid_arguments(
                violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }

    pub fn prepare(&self, args: &Value) -> Result<HttpRequest, OpenApiError> {
        let fields = self.validate(args)?;
        prepare_request(
            &self.base_url,
            self.operation.method,
            &self.operation.path,
            &self.schema.mapping,
            &fields,
        )
    }

    pub async fn execute(&self, args: &Value) -> Result<ResponsePayload, OpenApiError> {
        let request = self.prepare(args)?;
        self.executor.execute(&self.name, request).await
    }
}

impl Tool for OpenApiTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description().to_string(),
            input_schema: self.schema.json_schema.to_string(),
        }
    }

    fn invoke<'a>(
        &'a self,
        args: ToolArgs,
        _context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<String, ToolError>> {
        Box::pin(async move {
            self.execute(&Value::Object(args))
                .await
                .map(ResponsePayload::into_tool_output)
                .map_err(|error| ToolError::from(error).with_tool_name(self.name.as_str()))
        })
    }
}
