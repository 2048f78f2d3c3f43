//! Flattens a validated document into [`Operation`] records.
//!
//! ```rust
//! use fopenapi::{HttpMethod, parse_operations};
//! use serde_json::json;
//!
//! let operations = parse_operations(&json!({
//!     "openapi": "3.0.0",
//!     "info": {"title": "Petstore", "version": "1.0.0"},
//!     "paths": {
//!         "/pets": {
//!             "post": {
//!                 "operationId": "createPet",
//!                 "responses": {"201": {"description": "Created"}}
//!             },
//!             "get": {
//!                 "operationId": "listPets",
//!                 "responses": {"200": {"description": "OK"}}
//!             }
//!         }
//!     }
//! }))
//! .expect("document should parse");
//!
//! let methods: Vec<HttpMethod> = operations.iter().map(|op| op.method).collect();
//! assert_eq!(methods, [HttpMethod::Get, HttpMethod::Post]);
//! ```

use serde_json::{Map, Value};

use crate::document::{HttpMethod, Operation, ParameterLocation, ParameterSpec};
use crate::error::OpenApiError;
use crate::validate::{child, validate_document};

const MAX_REF_DEPTH: usize = 32;

/// Validates `document`, then extracts its operations.
pub fn parse_operations(document: &Value) -> Result<Vec<Operation>, OpenApiError> {
    validate_document(document)?;
    extract_operations(document)
}

/// Walks `paths` in document order, visiting methods in [`HttpMethod::ALL`] order.
///
/// Local `$ref`s on parameters, request bodies, and the top-level JSON body
/// schema are resolved; anything that cannot be resolved fails as `InvalidSpec`.
pub fn extract_operations(document: &Value) -> Result<Vec<Operation>, OpenApiError> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let resolver = RefResolver { document };
    let mut operations = Vec::new();
    let mut violations = Vec::new();

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        for method in HttpMethod::ALL {
            let Some(raw) = item.get(method.as_str()).and_then(Value::as_object) else {
                continue;
            };
            let pointer = child(&child("#/paths", path), method.as_str());
            match extract_operation(&resolver, method, path, raw, &pointer) {
                Ok(operation) => operations.push(operation),
                Err(mut errors) => violations.append(&mut errors),
            }
        }
    }

    if violations.is_empty() {
        Ok(operations)
    } else {
        Err(OpenApiError::invalid_spec(violations))
    }
}

fn extract_operation(
    resolver: &RefResolver<'_>,
    method: HttpMethod,
    path: &str,
    raw: &Map<String, Value>,
    pointer: &str,
) -> Result<Operation, Vec<String>> {
    let mut violations = Vec::new();

    let parameters = raw.get("parameters").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let pointer = format!("{pointer}/parameters/{index}");
                resolver
                    .resolve(item)
                    .and_then(parameter_from_value)
                    .map_err(|message| violations.push(format!("{pointer}: {message}")))
                    .ok()
            })
            .collect::<Vec<_>>()
    });

    let request_body = match raw.get("requestBody") {
        Some(body) => match resolve_request_body(resolver, body) {
            Ok(body) => Some(body),
            Err(message) => {
                violations.push(format!("{pointer}/requestBody: {message}"));
                None
            }
        },
        None => None,
    };

    if !violations.is_empty() {
        return Err(violations);
    }

    let text = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    Ok(Operation {
        operation_id: text("operationId"),
        method,
        path: path.to_string(),
        summary: text("summary"),
        description: text("description"),
        parameters,
        request_body,
    })
}

fn parameter_from_value(value: &Value) -> Result<ParameterSpec, String> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| "parameter is missing a string 'name'".to_string())?;
    let location = value
        .get("in")
        .and_then(Value::as_str)
        .and_then(ParameterLocation::parse)
        .ok_or_else(|| format!("parameter '{name}' has an unsupported location"))?;

    Ok(ParameterSpec {
        name: name.to_string(),
        location,
        required: value
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        schema: value.get("schema").cloned().unwrap_or(Value::Null),
        description: value
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Resolves the body object and its `application/json` schema in place.
fn resolve_request_body(resolver: &RefResolver<'_>, body: &Value) -> Result<Value, String> {
    let mut body = resolver.resolve(body)?.clone();
    let schema = body
        .pointer("/content/application~1json/schema")
        .map(|schema| resolver.resolve(schema).cloned())
        .transpose()?;

    if let Some(schema) = schema
        && let Some(slot) = body.pointer_mut("/content/application~1json/schema")
    {
        *slot = schema;
    }
    Ok(body)
}

struct RefResolver<'a> {
    document: &'a Value,
}

impl<'a> RefResolver<'a> {
    /// Follows `$ref` chains until a non-reference value is reached.
    fn resolve<'v>(&self, value: &'v Value) -> Result<&'v Value, String>
    where
        'a: 'v,
    {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref") else {
                return Ok(current);
            };
            let Some(reference) = reference.as_str() else {
                return Err("'$ref' must be a string".to_string());
            };
            let Some(pointer) = reference.strip_prefix('#') else {
                return Err(format!(
                    "only local references are supported, got '{reference}'"
                ));
            };
            current = self
                .document
                .pointer(pointer)
                .ok_or_else(|| format!("unresolved reference '{reference}'"))?;
        }

        Err(format!(
            "reference chain exceeds {MAX_REF_DEPTH} levels"
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::OpenApiErrorKind;

    fn ok() -> Value {
        json!({"200": {"description": "OK"}})
    }

    fn document(paths: Value) -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Test", "version": "1.0.0"},
            "paths": paths,
            "components": {
                "parameters": {
                    "limit": {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                    "alias": {"$ref": "#/components/parameters/limit"}
                },
                "requestBodies": {
                    "user": {
                        "content": {
                            "application/json": {"schema": {"$ref": "#/components/schemas/User"}}
                        }
                    }
                },
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {"name": {"type": "string"}},
                        "required": ["name"]
                    }
                }
            }
        })
    }

    #[test]
    fn count_and_order_follow_paths_then_methods() {
        let operations = parse_operations(&document(json!({
            "/a": {
                "options": {"responses": ok()},
                "get": {"responses": ok()},
                "summary": "path-level fields are ignored"
            },
            "/b": {"delete": {"responses": ok()}, "put": {"responses": ok()}},
            "/c": {"trace": {"responses": ok()}}
        })))
        .expect("document should parse");

        let pairs = operations
            .iter()
            .map(|op| (op.path.as_str(), op.method))
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                ("/a", HttpMethod::Get),
                ("/a", HttpMethod::Options),
                ("/b", HttpMethod::Put),
                ("/b", HttpMethod::Delete),
            ]
        );
    }

    #[test]
    fn fields_are_copied_verbatim() {
        let operations = parse_operations(&document(json!({
            "/weather": {
                "get": {
                    "summary": "Get weather",
                    "responses": ok(),
                    "parameters": [{
                        "name": "location",
                        "in": "query",
                        "required": true,
                        "description": "City",
                        "schema": {"type": "string"}
                    }]
                }
            }
        })))
        .expect("document should parse");

        let operation = &operations[0];
        assert_eq!(operation.operation_id, None);
        assert_eq!(operation.summary.as_deref(), Some("Get weather"));
        assert_eq!(operation.description, None);
        assert_eq!(operation.request_body, None);
        let parameters = operation.parameters.as_ref().expect("parameters present");
        assert_eq!(
            parameters[0],
            ParameterSpec::new("location", ParameterLocation::Query)
                .with_required(true)
                .with_schema(json!({"type": "string"}))
                .with_description("City")
        );
    }

    #[test]
    fn empty_paths_yield_no_operations() {
        assert!(
            parse_operations(&document(json!({})))
                .expect("document should parse")
                .is_empty()
        );
    }

    #[test]
    fn local_references_are_resolved() {
        let operations = parse_operations(&document(json!({
            "/users": {
                "post": {
                    "operationId": "createUser",
                    "responses": ok(),
                    "parameters": [{"$ref": "#/components/parameters/alias"}],
                    "requestBody": {"$ref": "#/components/requestBodies/user"}
                }
            }
        })))
        .expect("document should parse");

        let operation = &operations[0];
        let parameters = operation.parameters.as_ref().expect("parameters present");
        assert_eq!(parameters[0].name, "limit");
        assert_eq!(
            operation.json_body_schema(),
            Some(&json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            }))
        );
    }

    #[test]
    fn unresolved_references_are_invalid_specs() {
        let error = parse_operations(&document(json!({
            "/users": {
                "get": {
                    "responses": ok(),
                    "parameters": [{"$ref": "#/components/parameters/missing"}]
                },
                "post": {
                    "responses": ok(),
                    "requestBody": {"$ref": "https://example.com/body.json"}
                }
            }
        })))
        .expect_err("dangling references should fail");

        assert_eq!(error.kind, OpenApiErrorKind::InvalidSpec);
        assert_eq!(
            error.message,
            "Invalid OpenAPI spec: \
             #/paths/~1users/get/parameters/0: unresolved reference '#/components/parameters/missing', \
             #/paths/~1users/post/requestBody: only local references are supported, got 'https://example.com/body.json'"
        );
    }

    #[test]
    fn reference_cycles_are_bounded() {
        let mut spec = document(json!({
            "/loop": {
                "get": {"responses": ok(), "parameters": [{"$ref": "#/components/parameters/a"}]}
            }
        }));
        spec["components"]["parameters"]["a"] = json!({"$ref": "#/components/parameters/b"});
        spec["components"]["parameters"]["b"] = json!({"$ref": "#/components/parameters/a"});

        let error = parse_operations(&spec).expect_err("cycles should fail");
        assert!(error.message.contains("reference chain exceeds 32 levels"));
    }

    #[test]
    fn invalid_documents_are_rejected_before_extraction() {
        let error = parse_operations(&json!({"paths": {}})).expect_err("missing fields");
        assert_eq!(error.kind, OpenApiErrorKind::InvalidSpec);
        assert!(error.message.starts_with("Invalid OpenAPI spec: "));
    }
}
