//! Merges declared parameters and JSON body properties into one flat schema.
//!
//! ```rust
//! use fopenapi::{FieldLocation, HttpMethod, Operation, ParameterLocation, ParameterSpec, synthesize};
//! use serde_json::json;
//!
//! let operation = Operation::new(HttpMethod::Put, "/users/{id}")
//!     .with_parameter(
//!         ParameterSpec::new("id", ParameterLocation::Path).with_schema(json!({"type": "string"})),
//!     )
//!     .with_request_body(json!({
//!         "content": {"application/json": {"schema": {
//!             "type": "object",
//!             "properties": {"email": {"type": "string"}},
//!             "required": ["email"]
//!         }}}
//!     }));
//!
//! let schema = synthesize(&operation).expect("schema should synthesize");
//! assert_eq!(schema.json_schema["required"], json!(["id", "email"]));
//! assert_eq!(schema.mapping.location("id"), Some(FieldLocation::Path));
//! assert_eq!(schema.mapping.location("email"), Some(FieldLocation::Body));
//! assert_eq!(schema.body_fields, ["email"]);
//! ```

use fcommon::Registry;
use serde_json::{Map, Value};

use crate::document::{Operation, ParameterLocation};
use crate::error::OpenApiError;
use crate::schema::{self, SchemaNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

impl From<ParameterLocation> for FieldLocation {
    fn from(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Path => Self::Path,
            ParameterLocation::Query => Self::Query,
            ParameterLocation::Header => Self::Header,
            ParameterLocation::Cookie => Self::Cookie,
        }
    }
}

/// Where each input field is re-injected into the outgoing request.
#[derive(Debug, Clone, Default)]
pub struct ParameterMapping {
    fields: Registry<String, FieldLocation>,
}

impl ParameterMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name`; a later insert for the same name wins.
    pub fn insert(&mut self, name: impl Into<String>, location: FieldLocation) {
        self.fields.insert(name.into(), location);
    }

    pub fn location(&self, name: &str) -> Option<FieldLocation> {
        self.fields.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldLocation)> {
        self.fields
            .iter()
            .map(|(name, location)| (name.as_str(), *location))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ParameterSchema {
    /// `{"type": "object", "properties": .., "required": ..}` advertised to models.
    pub json_schema: Value,
    pub node: SchemaNode,
    pub mapping: ParameterMapping,
    pub body_fields: Vec<String>,
}

pub fn synthesize(operation: &Operation) -> Result<ParameterSchema, OpenApiError> {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut mapping = ParameterMapping::new();

    for parameter in operation.parameters.iter().flatten() {
        let mut property = match &parameter.schema {
            Value::Object(schema) => schema.clone(),
            Value::Null => Map::new(),
            // Booleans read as unconstrained; anything else fails to build.
            other => {
                schema::build(other, &parameter.name)?;
                Map::new()
            }
        };
        if let Some(description) = &parameter.description {
            property.insert(
                "description".to_string(),
                Value::String(description.clone()),
            );
        }
        properties.insert(parameter.name.clone(), Value::Object(property));
        if parameter.required {
            push_unique(&mut required, &parameter.name);
        }
        mapping.insert(parameter.name.clone(), parameter.location.into());
    }

    // Body properties are merged after parameters and win on name collisions.
    let mut body_fields = Vec::new();
    if let Some(body) = object_body_schema(operation) {
        if let Some(Value::Object(body_properties)) = body.get("properties") {
            for (name, property) in body_properties {
                properties.insert(name.clone(), property.clone());
                mapping.insert(name.clone(), FieldLocation::Body);
                push_unique(&mut body_fields, name);
            }
        }
        if let Some(Value::Array(names)) = body.get("required") {
            for name in names.iter().filter_map(Value::as_str) {
                push_unique(&mut required, name);
            }
        }
    }

    let mut json_schema = Map::new();
    json_schema.insert("type".to_string(), Value::String("object".to_string()));
    json_schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        json_schema.insert(
            "required".to_string(),
            Value::Array(required.into_iter().map(Value::String).collect()),
        );
    }
    let json_schema = Value::Object(json_schema);
    let node = SchemaNode::from_json(&json_schema)?;

    Ok(ParameterSchema {
        json_schema,
        node,
        mapping,
        body_fields,
    })
}

/// Only `application/json` bodies typed `object` with `properties` are merged.
fn object_body_schema(operation: &Operation) -> Option<&Map<String, Value>> {
    let schema = operation.json_body_schema()?.as_object()?;
    let is_object = schema.get("type").and_then(Value::as_str) == Some("object");
    (is_object && schema.get("properties").is_some_and(Value::is_object)).then_some(schema)
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}
