//! Structured output schemas.
//!
//! An [`OutputSchema`] is one of a closed set of descriptors:
//!
//! - **Typed**: generated from a Rust type with `schemars`; a value
//!   conforms when it deserialises into that type.
//! - **JSON**: a hand-written JSON Schema object, checked for shape when
//!   constructed; a value conforms when every required property is
//!   present and every declared primitive type matches.
//!
//! Validation failures are reported as schema-validation
//! [`LlmError`]s, i.e. as completion-provider failures.

use std::fmt;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::AgentError;
use crate::error::{LlmError, Result};

type TypedCheck = fn(&Value) -> std::result::Result<(), String>;

#[derive(Clone, Copy)]
enum Conformance {
    Typed(TypedCheck),
    Json,
}

/// Declared shape of an agent's final output.
#[derive(Clone)]
pub struct OutputSchema {
    name: String,
    schema: Value,
    conformance: Conformance,
}

impl fmt::Debug for OutputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.conformance {
            Conformance::Typed(_) => "typed",
            Conformance::Json => "json",
        };
        f.debug_struct("OutputSchema")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}

impl OutputSchema {
    /// Schema for the Rust type `T`.
    ///
    /// ```rust,ignore
    /// #[derive(Deserialize, JsonSchema)]
    /// struct MathOutput { is_math: bool, reasoning: String }
    ///
    /// let schema = OutputSchema::of::<MathOutput>();
    /// ```
    #[must_use]
    pub fn of<T: JsonSchema + DeserializeOwned>() -> Self {
        Self {
            name: T::schema_name().into_owned(),
            schema: schemars::schema_for!(T).to_value(),
            conformance: Conformance::Typed(deserializes_as::<T>),
        }
    }

    /// Schema from a JSON Schema document describing an object.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidOutputSchema`] unless `schema` is an
    /// object schema (`"type": "object"`) whose `properties` is an object
    /// of property schemas and whose `required`, if present, lists only
    /// declared property names.
    pub fn from_json_schema(name: impl Into<String>, schema: Value) -> Result<Self> {
        let name = name.into();
        check_descriptor(&schema).map_err(|reason| AgentError::invalid_output_schema(&name, reason))?;
        Ok(Self {
            name,
            schema,
            conformance: Conformance::Json,
        })
    }

    /// Schema name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JSON Schema document.
    #[must_use]
    pub const fn json_schema(&self) -> &Value {
        &self.schema
    }

    /// Schema of a top-level property.
    #[must_use]
    pub fn property(&self, property: &str) -> Option<&Value> {
        self.schema.get("properties")?.get(property)
    }

    /// Declared JSON type of a top-level property, when the schema names one.
    #[must_use]
    pub fn property_type(&self, property: &str) -> Option<&str> {
        self.property(property)?.get("type")?.as_str()
    }

    /// Returns `true` if the schema lists top-level properties.
    #[must_use]
    pub fn has_properties(&self) -> bool {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|p| !p.is_empty())
    }

    /// Parse raw model text and check it against this schema.
    ///
    /// A Markdown code fence around the JSON is tolerated.
    ///
    /// # Errors
    ///
    /// Returns a schema-validation [`LlmError`] if the text is not JSON or
    /// the value does not conform.
    pub fn validate(&self, raw: &str) -> std::result::Result<Value, LlmError> {
        let value: Value = serde_json::from_str(strip_code_fence(raw))
            .map_err(|e| LlmError::schema_validation(&self.name, format!("not valid JSON: {e}")))?;
        self.check(&value)?;
        Ok(value)
    }

    /// Check an already-parsed value against this schema.
    ///
    /// # Errors
    ///
    /// Returns a schema-validation [`LlmError`] if the value does not conform.
    pub fn check(&self, value: &Value) -> std::result::Result<(), LlmError> {
        let outcome = match self.conformance {
            Conformance::Typed(check) => check(value),
            Conformance::Json => conforms(&self.schema, value),
        };
        outcome.map_err(|reason| LlmError::schema_validation(&self.name, reason))
    }
}

fn deserializes_as<T: DeserializeOwned>(value: &Value) -> std::result::Result<(), String> {
    T::deserialize(value).map(drop).map_err(|e| e.to_string())
}

fn check_descriptor(schema: &Value) -> std::result::Result<(), String> {
    let obj = schema.as_object().ok_or("schema must be a JSON object")?;

    if obj.get("type").and_then(Value::as_str) != Some("object") {
        return Err("schema must declare \"type\": \"object\"".into());
    }

    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .ok_or("schema must declare a \"properties\" object")?;

    if let Some((key, _)) = properties.iter().find(|(_, v)| !v.is_object()) {
        return Err(format!("property '{key}' must be a schema object"));
    }

    if let Some(required) = obj.get("required") {
        let required = required
            .as_array()
            .ok_or("\"required\" must be an array of property names")?;
        for entry in required {
            let key = entry
                .as_str()
                .ok_or("\"required\" must be an array of property names")?;
            if !properties.contains_key(key) {
                return Err(format!("required property '{key}' is not declared"));
            }
        }
    }

    Ok(())
}

fn conforms(schema: &Value, value: &Value) -> std::result::Result<(), String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, got {}", json_type(value)))?;

    for key in schema["required"].as_array().into_iter().flatten() {
        if let Some(key) = key.as_str()
            && !object.contains_key(key)
        {
            return Err(format!("missing required field `{key}`"));
        }
    }

    let empty = Map::new();
    let properties = schema["properties"].as_object().unwrap_or(&empty);
    for (key, field) in object {
        let Some(declared) = properties.get(key).and_then(|p| p.get("type")) else {
            continue;
        };
        if !type_matches(declared, field) {
            return Err(format!(
                "field `{key}` should be {declared}, got {}",
                json_type(field)
            ));
        }
    }

    Ok(())
}

fn type_matches(declared: &Value, value: &Value) -> bool {
    match declared {
        Value::String(name) => is_type(name, value),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| is_type(name, value)),
        _ => true,
    }
}

fn is_type(name: &str, value: &Value) -> bool {
    match name {
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct MathHomeworkOutput {
        is_math_homework: bool,
        reasoning: String,
    }

    #[test]
    fn test_typed_schema_accepts_conforming_json() {
        let schema = OutputSchema::of::<MathHomeworkOutput>();
        assert_eq!(schema.name(), "MathHomeworkOutput");
        assert_eq!(schema.property_type("is_math_homework"), Some("boolean"));

        let value = schema
            .validate(r#"{"is_math_homework": true, "reasoning": "asks for 2+2"}"#)
            .unwrap();
        assert_eq!(value["is_math_homework"], true);
    }

    #[test]
    fn test_typed_schema_rejects_missing_field() {
        let schema = OutputSchema::of::<MathHomeworkOutput>();
        let err = schema.validate(r#"{"reasoning": "no flag"}"#).unwrap_err();
        assert!(err.is_schema_validation());
        assert!(err.message.contains("is_math_homework"));
    }

    #[test]
    fn test_validate_strips_code_fence() {
        let schema = OutputSchema::of::<MathHomeworkOutput>();
        let raw = "```json\n{\"is_math_homework\": false, \"reasoning\": \"greeting\"}\n```";
        assert_eq!(schema.validate(raw).unwrap()["is_math_homework"], false);
    }

    #[test]
    fn test_validate_rejects_plain_text() {
        let schema = OutputSchema::of::<MathHomeworkOutput>();
        let err = schema.validate("Sure, 2+2 is 4.").unwrap_err();
        assert!(err.is_schema_validation());
        assert!(err.message.contains("not valid JSON"));
    }

    #[test]
    fn test_json_schema_descriptor_checks() {
        let ok = OutputSchema::from_json_schema(
            "MessageOutput",
            json!({
                "type": "object",
                "properties": { "response": { "type": "string" } },
                "required": ["response"]
            }),
        );
        assert!(ok.is_ok());

        let not_object = OutputSchema::from_json_schema("Bad", json!({ "type": "string" }));
        assert!(matches!(
            not_object,
            Err(crate::Error::Agent(AgentError::InvalidOutputSchema { .. }))
        ));

        let undeclared_required = OutputSchema::from_json_schema(
            "Bad",
            json!({ "type": "object", "properties": {}, "required": ["response"] }),
        );
        assert!(undeclared_required.is_err());

        let no_properties = OutputSchema::from_json_schema("Bad", json!({ "type": "object" }));
        assert!(no_properties.is_err());
    }

    #[test]
    fn test_json_schema_value_conformance() {
        let schema = OutputSchema::from_json_schema(
            "MathOutput",
            json!({
                "type": "object",
                "properties": {
                    "is_math": { "type": "boolean" },
                    "reasoning": { "type": ["string", "null"] }
                },
                "required": ["is_math"]
            }),
        )
        .unwrap();

        assert!(schema.check(&json!({ "is_math": true, "reasoning": null })).is_ok());
        assert!(schema.check(&json!({ "is_math": true, "extra": 1 })).is_ok());

        let err = schema.check(&json!({ "is_math": "yes" })).unwrap_err();
        assert!(err.message.contains("`is_math`"));

        let err = schema.check(&json!({ "reasoning": "none" })).unwrap_err();
        assert!(err.message.contains("missing required field"));

        assert!(schema.check(&json!(["is_math"])).is_err());
    }
}
