//! Validation of OpenAPI 3.x documents against the published OAS meta-schemas.
//!
//! The `openapi` field selects the 3.0 or 3.1 meta-schema. Every violation is
//! reported as `<json-pointer>: <message>` and all of them are collected
//! before failing.
//!
//! ```rust
//! use fopenapi::{OpenApiErrorKind, validate_document};
//! use serde_json::json;
//!
//! let error = validate_document(&json!({"openapi": "2.0"}))
//!     .expect_err("swagger 2 documents are rejected");
//! assert_eq!(error.kind, OpenApiErrorKind::InvalidSpec);
//! assert_eq!(
//!     error.message,
//!     "Invalid OpenAPI spec: #/openapi: unsupported version '2.0'"
//! );
//!
//! let error = validate_document(&json!({
//!     "openapi": "3.0.3",
//!     "info": {"title": "Petstore", "version": "1.0.0", "contact": 5},
//!     "paths": {}
//! }))
//! .expect_err("contact must be an object");
//! assert!(error.message.contains("#/info/contact: "));
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use jsonschema::Validator;
use serde_json::Value;

use crate::document::HttpMethod;
use crate::error::OpenApiError;

static OAS_3_0: LazyLock<Result<Validator, String>> =
    LazyLock::new(|| compile(include_str!("../schemas/oas-3.0.json")));

static OAS_3_1: LazyLock<Result<Validator, String>> =
    LazyLock::new(|| compile(include_str!("../schemas/oas-3.1.json")));

fn compile(source: &str) -> Result<Validator, String> {
    let schema: Value = serde_json::from_str(source).map_err(|error| error.to_string())?;
    jsonschema::validator_for(&schema).map_err(|error| error.to_string())
}

pub fn validate_document(document: &Value) -> Result<(), OpenApiError> {
    let violations = collect_violations(document);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(OpenApiError::invalid_spec(violations))
    }
}

pub(crate) fn collect_violations(document: &Value) -> Vec<String> {
    let validator = match meta_schema_for(document) {
        Ok(validator) => validator,
        Err(violation) => return vec![violation],
    };

    let violations: Vec<String> = validator
        .iter_errors(document)
        .map(|error| format!("#{}: {error}", error.instance_path))
        .collect();
    if !violations.is_empty() {
        return violations;
    }

    duplicate_parameters(document)
}

fn meta_schema_for(document: &Value) -> Result<&'static Validator, String> {
    let compiled = match document.get("openapi") {
        Some(Value::String(version)) if version.starts_with("3.0") => &*OAS_3_0,
        Some(Value::String(version)) if version.starts_with("3.1") => &*OAS_3_1,
        Some(Value::String(version)) => {
            return Err(format!("#/openapi: unsupported version '{version}'"));
        }
        Some(_) => return Err("#/openapi: must be a string".to_string()),
        None if document.is_object() => return Err("#/openapi: is required".to_string()),
        None => return Err("#: document must be an object".to_string()),
    };

    compiled
        .as_ref()
        .map_err(|error| format!("#: meta-schema failed to load: {error}"))
}

/// `(name, in)` pairs must be unique per operation, which the meta-schemas
/// cannot express.
fn duplicate_parameters(document: &Value) -> Vec<String> {
    let mut violations = Vec::new();
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return violations;
    };

    for (path, item) in paths {
        for method in HttpMethod::ALL {
            let Some(parameters) = item
                .get(method.as_str())
                .and_then(|operation| operation.get("parameters"))
                .and_then(Value::as_array)
            else {
                continue;
            };

            let pointer = child(&child(&child("#/paths", path), method.as_str()), "parameters");
            let mut seen = HashSet::new();
            for (index, parameter) in parameters.iter().enumerate() {
                let name = parameter.get("name").and_then(Value::as_str);
                let location = parameter.get("in").and_then(Value::as_str);
                if let (Some(name), Some(location)) = (name, location)
                    && !seen.insert((name, location))
                {
                    violations.push(format!(
                        "{pointer}/{index}: duplicate parameter '{name}' in {location}"
                    ));
                }
            }
        }
    }

    violations
}

/// Appends `segment` to a JSON pointer, escaping `~` and `/`.
pub(crate) fn child(pointer: &str, segment: &str) -> String {
    format!(
        "{pointer}/{}",
        segment.replace('~', "~0").replace('/', "~1")
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn minimal(paths: Value) -> Value {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Test API", "version": "1.0.0"},
            "paths": paths
        })
    }

    fn ok() -> Value {
        json!({"200": {"description": "OK"}})
    }

    #[test]
    fn accepts_minimal_documents() {
        assert!(validate_document(&minimal(json!({}))).is_ok());
        assert!(
            validate_document(&json!({
                "openapi": "3.1.0",
                "info": {"title": "Webhooks only", "version": "1"},
                "webhooks": {}
            }))
            .is_ok()
        );
    }

    #[test]
    fn rejects_documents_without_a_supported_version() {
        assert_eq!(collect_violations(&json!([])), vec!["#: document must be an object"]);
        assert_eq!(collect_violations(&json!({})), vec!["#/openapi: is required"]);
        assert_eq!(
            collect_violations(&json!({"openapi": 3})),
            vec!["#/openapi: must be a string"]
        );
        assert_eq!(
            collect_violations(&json!({"openapi": "3.2.0"})),
            vec!["#/openapi: unsupported version '3.2.0'"]
        );
    }

    #[test]
    fn both_meta_schemas_load() {
        assert!(OAS_3_0.is_ok());
        assert!(OAS_3_1.is_ok());
    }

    #[test]
    fn malformed_nested_objects_are_reported_with_pointers() {
        let violations = collect_violations(&json!({
            "openapi": "3.0.3",
            "info": {"title": "Broken", "version": "1.0.0", "contact": 5},
            "paths": {
                "/search": {
                    "get": {
                        "responses": {"200": 5},
                        "parameters": [{"name": "q", "in": "query", "schema": "string"}]
                    }
                }
            }
        }));

        assert!(violations.iter().any(|v| v.starts_with("#/info/contact: ")));
        assert!(
            violations
                .iter()
                .any(|v| v.starts_with("#/paths/~1search/get/responses/200: "))
        );
        assert!(
            violations
                .iter()
                .any(|v| v.starts_with("#/paths/~1search/get/parameters/0: "))
        );
    }

    #[test]
    fn paths_are_required_for_openapi_3_0() {
        let violations = collect_violations(&json!({
            "openapi": "3.0.0",
            "info": {"title": "t", "version": "1"},
            "components": {}
        }));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("#: "));
        assert!(violations[0].contains("paths"));
    }

    #[test]
    fn operations_need_responses_in_3_0() {
        let violations = collect_violations(&minimal(json!({
            "/pets": {"get": {"operationId": "listPets"}}
        })));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("#/paths/~1pets/get: "));
        assert!(violations[0].contains("responses"));
    }

    #[test]
    fn path_parameters_must_be_required() {
        let violations = collect_violations(&minimal(json!({
            "/users/{id}": {
                "get": {
                    "responses": ok(),
                    "parameters": [{"name": "id", "in": "path", "schema": {"type": "string"}}]
                }
            }
        })));
        assert!(
            violations
                .iter()
                .any(|v| v.starts_with("#/paths/~1users~1{id}/get/parameters/0: "))
        );
    }

    #[test]
    fn duplicate_parameters_are_reported_after_structural_checks() {
        let violations = collect_violations(&minimal(json!({
            "/pets": {
                "get": {
                    "responses": ok(),
                    "parameters": [
                        {"name": "limit", "in": "query", "schema": {"type": "integer"}},
                        {"name": "limit", "in": "query", "schema": {"type": "string"}}
                    ]
                }
            }
        })));

        assert_eq!(
            violations,
            vec!["#/paths/~1pets/get/parameters/1: duplicate parameter 'limit' in query"]
        );
    }

    #[test]
    fn reference_parameters_and_shared_names_are_accepted() {
        let document = minimal(json!({
            "/pets": {
                "get": {
                    "responses": ok(),
                    "parameters": [
                        {"$ref": "#/components/parameters/limit"},
                        {"name": "token", "in": "query", "schema": {"type": "string"}},
                        {"name": "token", "in": "header", "schema": {"type": "string"}}
                    ]
                }
            }
        }));
        assert!(collect_violations(&document).is_empty());
    }
}
