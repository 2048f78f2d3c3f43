//! Runtime-checkable schema tree built from JSON-Schema-shaped values.
//!
//! ```rust
//! use fopenapi::SchemaNode;
//! use serde_json::json;
//!
//! let node = SchemaNode::from_json(&json!({
//!     "type": "object",
//!     "properties": {
//!         "q": {"type": "string"},
//!         "limit": {"type": "integer", "minimum": 1}
//!     },
//!     "required": ["q"]
//! }))
//! .expect("schema should build");
//!
//! let parsed = node
//!     .parse(&json!({"q": "test", "limit": 10, "extra": true}))
//!     .expect("arguments should validate");
//! assert_eq!(parsed, json!({"q": "test", "limit": 10}));
//!
//! let violations = node.parse(&json!({"limit": 0})).expect_err("q is required");
//! let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
//! assert_eq!(messages, ["q: Required", "limit: Number must be greater than or equal to 1"]);
//! ```

use std::fmt::{Display, Formatter};

use serde_json::{Map, Value};

use crate::error::OpenApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Any,
    String {
        min_length: Option<u64>,
        max_length: Option<u64>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Integer {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Array {
        items: Box<SchemaNode>,
        min_items: Option<u64>,
        max_items: Option<u64>,
    },
    Object(ObjectSchema),
    Enum(Vec<Value>),
    Nullable(Box<SchemaNode>),
}

/// Object shape; `properties: None` accepts any keys unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: Option<Vec<(String, SchemaNode)>>,
    pub required: Vec<String>,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .as_ref()?
            .iter()
            .find_map(|(key, node)| (key == name).then_some(node))
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Dotted field path, empty for the root value.
    pub path: String,
    pub message: String,
}

impl Display for SchemaViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl SchemaNode {
    /// Translates a JSON-Schema-shaped value.
    ///
    /// `$ref`, composition keywords, and untyped schemas without properties
    /// become [`SchemaNode::Any`]; malformed keywords fail with `SchemaBuild`.
    pub fn from_json(schema: &Value) -> Result<Self, OpenApiError> {
        build(schema, "")
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Any | Self::Nullable(_))
    }

    /// Validates `value`, returning it with undeclared object keys stripped.
    pub fn parse(&self, value: &Value) -> Result<Value, Vec<SchemaViolation>> {
        let mut violations = Vec::new();
        let parsed = self.check(value, "", &mut violations);
        if violations.is_empty() {
            Ok(parsed)
        } else {
            Err(violations)
        }
    }

    fn check(&self, value: &Value, path: &str, violations: &mut Vec<SchemaViolation>) -> Value {
        let mut fail = |message: String| {
            violations.push(SchemaViolation {
                path: path.to_string(),
                message,
            })
        };

        match self {
            Self::Any => value.clone(),
            Self::Nullable(inner) => match value {
                Value::Null => Value::Null,
                _ => inner.check(value, path, violations),
            },
            Self::String {
                min_length,
                max_length,
            } => {
                let Some(text) = value.as_str() else {
                    fail(expected("string", value));
                    return Value::Null;
                };
                let length = text.chars().count() as u64;
                if let Some(min) = min_length
                    && length < *min
                {
                    fail(format!("String must contain at least {min} character(s)"));
                }
                if let Some(max) = max_length
                    && length > *max
                {
                    fail(format!("String must contain at most {max} character(s)"));
                }
                value.clone()
            }
            Self::Number { minimum, maximum } | Self::Integer { minimum, maximum } => {
                let Some(number) = value.as_f64() else {
                    fail(expected(
                        if matches!(self, Self::Integer { .. }) {
                            "integer"
                        } else {
                            "number"
                        },
                        value,
                    ));
                    return Value::Null;
                };
                if matches!(self, Self::Integer { .. }) && number.fract() != 0.0 {
                    fail("Expected integer, received float".to_string());
                }
                if let Some(min) = minimum
                    && number < *min
                {
                    fail(format!("Number must be greater than or equal to {min}"));
                }
                if let Some(max) = maximum
                    && number > *max
                {
                    fail(format!("Number must be less than or equal to {max}"));
                }
                value.clone()
            }
            Self::Boolean => {
                if !value.is_boolean() {
                    fail(expected("boolean", value));
                }
                value.clone()
            }
            Self::Enum(options) => {
                if !options.contains(value) {
                    let expected = options
                        .iter()
                        .map(Value::to_string)
                        .collect::<Vec<_>>()
                        .join(" | ");
                    fail(format!(
                        "Invalid enum value. Expected {expected}, received {value}"
                    ));
                }
                value.clone()
            }
            Self::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(elements) = value.as_array() else {
                    fail(expected("array", value));
                    return Value::Null;
                };
                let count = elements.len() as u64;
                if let Some(min) = min_items
                    && count < *min
                {
                    fail(format!("Array must contain at least {min} element(s)"));
                }
                if let Some(max) = max_items
                    && count > *max
                {
                    fail(format!("Array must contain at most {max} element(s)"));
                }
                Value::Array(
                    elements
                        .iter()
                        .enumerate()
                        .map(|(index, element)| {
                            items.check(element, &format!("{path}[{index}]"), violations)
                        })
                        .collect(),
                )
            }
            Self::Object(object) => {
                let Some(fields) = value.as_object() else {
                    fail(expected("object", value));
                    return Value::Null;
                };
                object.check(fields, path, violations)
            }
        }
    }
}

impl ObjectSchema {
    fn check(
        &self,
        fields: &Map<String, Value>,
        path: &str,
        violations: &mut Vec<SchemaViolation>,
    ) -> Value {
        let Some(properties) = &self.properties else {
            return Value::Object(fields.clone());
        };

        let mut parsed = Map::new();
        for (name, node) in properties {
            let field_path = join_path(path, name);
            match fields.get(name) {
                Some(Value::Null) if node.is_nullable() => {
                    parsed.insert(name.clone(), Value::Null);
                }
                None | Some(Value::Null) if self.is_required(name) => {
                    violations.push(SchemaViolation {
                        path: field_path,
                        message: "Required".to_string(),
                    });
                }
                None | Some(Value::Null) => {}
                Some(field) => {
                    parsed.insert(name.clone(), node.check(field, &field_path, violations));
                }
            }
        }

        for name in &self.required {
            if self.property(name).is_none()
                && fields.get(name).is_none_or(Value::is_null)
            {
                violations.push(SchemaViolation {
                    path: join_path(path, name),
                    message: "Required".to_string(),
                });
            }
        }

        Value::Object(parsed)
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn expected(kind: &str, value: &Value) -> String {
    format!("Expected {kind}, received {}", json_type(value))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn build(schema: &Value, path: &str) -> Result<SchemaNode, OpenApiError> {
    let object = match schema {
        Value::Object(object) => object,
        Value::Bool(_) => return Ok(SchemaNode::Any),
        other => {
            return Err(schema_error(
                path,
                format!("schema must be an object, got {}", json_type(other)),
            ));
        }
    };

    if ["$ref", "allOf", "anyOf", "oneOf", "not"]
        .iter()
        .any(|keyword| object.contains_key(*keyword))
    {
        return Ok(SchemaNode::Any);
    }

    let nullable_flag = object.get("nullable") == Some(&Value::Bool(true));

    if let Some(constant) = object.get("const") {
        return Ok(wrap_nullable(
            SchemaNode::Enum(vec![constant.clone()]),
            nullable_flag,
        ));
    }

    if let Some(values) = object.get("enum") {
        let Some(values) = values.as_array() else {
            return Err(schema_error(path, "'enum' must be an array"));
        };
        let nullable = nullable_flag || values.contains(&Value::Null);
        let values = values.iter().filter(|value| !value.is_null()).cloned().collect();
        return Ok(wrap_nullable(SchemaNode::Enum(values), nullable));
    }

    let (kind, nullable) = match object.get("type") {
        None if object.contains_key("properties") => (Some("object"), nullable_flag),
        None => return Ok(SchemaNode::Any),
        Some(Value::String(kind)) => (Some(kind.as_str()), nullable_flag),
        Some(Value::Array(kinds)) => {
            let mut names = Vec::with_capacity(kinds.len());
            for kind in kinds {
                let Some(kind) = kind.as_str() else {
                    return Err(schema_error(path, "'type' entries must be strings"));
                };
                names.push(kind);
            }
            let nullable = nullable_flag || names.contains(&"null");
            let non_null = names
                .into_iter()
                .filter(|kind| *kind != "null")
                .collect::<Vec<_>>();
            match non_null.as_slice() {
                [single] => (Some(*single), nullable),
                _ => (None, nullable),
            }
        }
        Some(_) => return Err(schema_error(path, "'type' must be a string or an array")),
    };

    let node = match kind {
        None => SchemaNode::Any,
        Some("string") => SchemaNode::String {
            min_length: object.get("minLength").and_then(Value::as_u64),
            max_length: object.get("maxLength").and_then(Value::as_u64),
        },
        Some("number") => SchemaNode::Number {
            minimum: object.get("minimum").and_then(Value::as_f64),
            maximum: object.get("maximum").and_then(Value::as_f64),
        },
        Some("integer") => SchemaNode::Integer {
            minimum: object.get("minimum").and_then(Value::as_f64),
            maximum: object.get("maximum").and_then(Value::as_f64),
        },
        Some("boolean") => SchemaNode::Boolean,
        Some("null") => SchemaNode::Enum(vec![Value::Null]),
        Some("array") => {
            let items = match object.get("items") {
                None => SchemaNode::Any,
                Some(items @ (Value::Object(_) | Value::Bool(_))) => {
                    build(items, &format!("{path}[]"))?
                }
                Some(_) => return Err(schema_error(path, "'items' must be a schema object")),
            };
            SchemaNode::Array {
                items: Box::new(items),
                min_items: object.get("minItems").and_then(Value::as_u64),
                max_items: object.get("maxItems").and_then(Value::as_u64),
            }
        }
        Some("object") => SchemaNode::Object(build_object(object, path)?),
        Some(other) => {
            return Err(schema_error(
                path,
                format!("unsupported schema type '{other}'"),
            ));
        }
    };

    Ok(wrap_nullable(node, nullable))
}

fn build_object(object: &Map<String, Value>, path: &str) -> Result<ObjectSchema, OpenApiError> {
    let properties = match object.get("properties") {
        None => None,
        Some(Value::Object(properties)) => {
            let mut nodes = Vec::with_capacity(properties.len());
            for (name, property) in properties {
                nodes.push((name.clone(), build(property, &join_path(path, name))?));
            }
            Some(nodes)
        }
        Some(_) => return Err(schema_error(path, "'properties' must be an object")),
    };

    let required = match object.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => {
            let mut required = Vec::with_capacity(names.len());
            for name in names {
                let Some(name) = name.as_str() else {
                    return Err(schema_error(path, "'required' entries must be strings"));
                };
                if !required.iter().any(|existing| existing == name) {
                    required.push(name.to_string());
                }
            }
            required
        }
        Some(_) => return Err(schema_error(path, "'required' must be an array")),
    };

    Ok(ObjectSchema {
        properties,
        required,
    })
}

fn wrap_nullable(node: SchemaNode, nullable: bool) -> SchemaNode {
    if nullable && !node.is_nullable() {
        SchemaNode::Nullable(Box::new(node))
    } else {
        node
    }
}

fn schema_error(path: &str, message: impl Display) -> OpenApiError {
    if path.is_empty() {
        OpenApiError::schema_build(message.to_string())
    } else {
        OpenApiError::schema_build(format!("{path}: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::OpenApiErrorKind;

    fn node(schema: Value) -> SchemaNode {
        SchemaNode::from_json(&schema).expect("schema should build")
    }

    fn messages(result: Result<Value, Vec<SchemaViolation>>) -> Vec<String> {
        result
            .expect_err("value should be rejected")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn scalar_types_are_checked() {
        assert!(node(json!({"type": "string"})).parse(&json!("x")).is_ok());
        assert_eq!(
            messages(node(json!({"type": "string"})).parse(&json!(1))),
            vec!["Expected string, received number"]
        );
        assert!(node(json!({"type": "number"})).parse(&json!(1.5)).is_ok());
        assert_eq!(
            messages(node(json!({"type": "integer"})).parse(&json!(1.5))),
            vec!["Expected integer, received float"]
        );
        assert!(node(json!({"type": "integer"})).parse(&json!(3)).is_ok());
        assert_eq!(
            messages(node(json!({"type": "boolean"})).parse(&json!("true"))),
            vec!["Expected boolean, received string"]
        );
    }

    #[test]
    fn nested_objects_and_arrays_report_paths() {
        let schema = node(json!({
            "type": "object",
            "properties": {
                "owner": {
                    "type": "object",
                    "properties": {"name": {"type": "string", "minLength": 2}},
                    "required": ["name"]
                },
                "tags": {"type": "array", "items": {"type": "string"}, "maxItems": 2}
            }
        }));

        assert_eq!(
            messages(schema.parse(&json!({
                "owner": {},
                "tags": ["a", 2, "c"]
            }))),
            vec![
                "owner.name: Required",
                "tags: Array must contain at most 2 element(s)",
                "tags[1]: Expected string, received number",
            ]
        );

        assert_eq!(
            messages(schema.parse(&json!({"owner": {"name": "x"}}))),
            vec!["owner.name: String must contain at least 2 character(s)"]
        );
    }

    #[test]
    fn enums_and_constants_match_exact_values() {
        let status = node(json!({"type": "string", "enum": ["available", "sold"]}));
        assert!(status.parse(&json!("sold")).is_ok());
        assert_eq!(
            messages(status.parse(&json!("lost"))),
            vec![r#"Invalid enum value. Expected "available" | "sold", received "lost""#]
        );
        assert_eq!(node(json!({"const": 3})), SchemaNode::Enum(vec![json!(3)]));
    }

    #[test]
    fn nullability_follows_type_arrays_and_flags() {
        let nullable = node(json!({"type": ["string", "null"]}));
        assert!(nullable.parse(&Value::Null).is_ok());
        assert!(nullable.parse(&json!("x")).is_ok());

        let flagged = node(json!({"type": "integer", "nullable": true}));
        assert_eq!(
            flagged,
            SchemaNode::Nullable(Box::new(SchemaNode::Integer {
                minimum: None,
                maximum: None
            }))
        );
        assert_eq!(node(json!({"type": ["string", "number"]})), SchemaNode::Any);
    }

    #[test]
    fn optional_nulls_are_dropped_and_required_nulls_fail() {
        let schema = node(json!({
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "note": {"type": "string"}
            },
            "required": ["id"]
        }));

        assert_eq!(
            schema
                .parse(&json!({"id": "1", "note": null}))
                .expect("optional null is dropped"),
            json!({"id": "1"})
        );
        assert_eq!(
            messages(schema.parse(&json!({"id": null}))),
            vec!["id: Required"]
        );
    }

    #[test]
    fn required_names_without_properties_are_still_enforced() {
        let schema = node(json!({
            "type": "object",
            "properties": {},
            "required": ["token"]
        }));
        assert_eq!(messages(schema.parse(&json!({}))), vec!["token: Required"]);
    }

    #[test]
    fn open_objects_pass_keys_through() {
        let schema = node(json!({"type": "object"}));
        assert_eq!(
            schema.parse(&json!({"a": 1})).expect("open object accepts keys"),
            json!({"a": 1})
        );
    }

    #[test]
    fn unsupported_constructs_degrade_to_any() {
        assert_eq!(node(json!({"$ref": "#/components/schemas/Pet"})), SchemaNode::Any);
        assert_eq!(node(json!({"oneOf": [{"type": "string"}]})), SchemaNode::Any);
        assert_eq!(node(json!({"description": "untyped"})), SchemaNode::Any);
    }

    #[test]
    fn malformed_schemas_fail_to_build() {
        for (schema, message) in [
            (json!({"type": "int"}), "unsupported schema type 'int'"),
            (json!({"enum": "a"}), "'enum' must be an array"),
            (json!({"type": "object", "properties": []}), "'properties' must be an object"),
            (json!({"type": "object", "required": [1]}), "'required' entries must be strings"),
            (json!({"type": "array", "items": 3}), "'items' must be a schema object"),
            (json!("string"), "schema must be an object, got string"),
        ] {
            let error = SchemaNode::from_json(&schema).expect_err("schema should be rejected");
            assert_eq!(error.kind, OpenApiErrorKind::SchemaBuild);
            assert_eq!(error.message, message);
        }

        let nested = SchemaNode::from_json(&json!({
            "type": "object",
            "properties": {"limit": {"type": "int"}}
        }))
        .expect_err("nested schema should be rejected");
        assert_eq!(nested.message, "limit: unsupported schema type 'int'");
    }
}
