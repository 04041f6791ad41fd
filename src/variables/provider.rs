//! VariableProvider trait and the shared payload parsing.

use crate::error::{RenderError, RenderResult};
use serde_json::{Map, Value};

/// Variables available to a template, keyed by top-level name
pub type TemplateVariables = Map<String, Value>;

/// Trait for template variable sources.
///
/// Each source (AWS Secrets Manager today) is constructed with its own
/// selector and produces the same mapping shape, so the render pipeline never
/// needs to know which one it is talking to.
pub trait VariableProvider {
    /// Get the source name for progress output (e.g., "secretsmanager")
    fn get_type(&self) -> &str;

    /// Fetch the variables.
    ///
    /// Called exactly once per run.
    fn fetch(&self) -> RenderResult<TemplateVariables>;
}

/// Parse a JSON payload into template variables.
///
/// The payload must be a JSON object; arrays and scalars are rejected even
/// though they are valid JSON.
pub fn parse_variables(payload: &str) -> RenderResult<TemplateVariables> {
    match serde_json::from_str::<Value>(payload)? {
        Value::Object(map) => Ok(map),
        other => Err(RenderError::SecretPayload(format!(
            "expected a JSON object at the top level, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_object() {
        let vars = parse_variables(
            r#"{"app":"demo","port":8080,"tls":true,"db":{"host":"db.internal"},"hosts":["a","b"]}"#,
        )
        .unwrap();

        assert_eq!(vars["app"], "demo");
        assert_eq!(vars["port"], 8080);
        assert_eq!(vars["tls"], true);
        assert_eq!(vars["db"]["host"], "db.internal");
        assert_eq!(vars["hosts"][1], "b");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_variables("not valid json").unwrap_err();
        assert!(matches!(err, RenderError::SecretPayload(_)));
    }

    #[test]
    fn test_parse_rejects_array() {
        let err = parse_variables(r#"["a","b"]"#).unwrap_err();
        assert!(err.to_string().contains("found an array"));
    }

    #[test]
    fn test_parse_rejects_scalar() {
        let err = parse_variables("\"just a string\"").unwrap_err();
        assert!(err.to_string().contains("found a string"));
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(parse_variables("{}").unwrap().is_empty());
    }
}
