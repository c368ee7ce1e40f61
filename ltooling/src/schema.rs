//! Best-effort argument schemas derived from declared JSON-schema-like specs.
//!
//! Only a closed set of field types is understood. Anything else degrades to
//! a permissive field instead of rejecting the tool.
//!
//! ```rust
//! use ltooling::{ArgumentSchema, FieldType};
//! use serde_json::json;
//!
//! let schema = ArgumentSchema::from_json_schema(&json!({
//!     "type": "object",
//!     "properties": {
//!         "query": { "type": "string" },
//!         "limit": { "type": "integer" },
//!         "filter": { "type": ["string", "null"] }
//!     },
//!     "required": ["query"]
//! }));
//!
//! assert_eq!(schema.field("limit").map(|f| f.field_type), Some(FieldType::Number));
//! assert_eq!(schema.field("filter").map(|f| f.field_type), Some(FieldType::Any));
//! assert!(schema.validate(&json!({ "query": "rust" })).is_ok());
//! assert!(schema.validate(&json!({ "limit": 3 })).is_err());
//! ```

use serde_json::{Map, Value, json};

use crate::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Any,
}

impl FieldType {
    fn from_declared(declared: Option<&Value>) -> Self {
        match declared.and_then(Value::as_str) {
            Some("string") => Self::String,
            Some("number") | Some("integer") => Self::Number,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            _ => Self::Any,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgumentSchema {
    fields: Vec<FieldSpec>,
    permissive: bool,
}

impl ArgumentSchema {
    /// Accepts any object and passes it through untouched.
    pub fn permissive() -> Self {
        Self {
            fields: Vec::new(),
            permissive: true,
        }
    }

    pub fn from_json_schema(schema: &Value) -> Self {
        if schema.get("type").and_then(Value::as_str) != Some("object") {
            return Self::permissive();
        }

        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let fields = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, property)| FieldSpec {
                        name: name.clone(),
                        field_type: FieldType::from_declared(property.get("type")),
                        required: required.contains(&name.as_str()),
                        description: property
                            .get("description")
                            .and_then(Value::as_str)
                            .map(ToString::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            fields,
            permissive: false,
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_permissive(&self) -> bool {
        self.permissive
    }

    /// Checks presence of required fields and the type of present ones.
    /// `null` arguments are treated as an empty object; unknown fields pass.
    pub fn validate(&self, arguments: &Value) -> Result<(), ToolError> {
        let empty = Map::new();
        let object = match arguments {
            Value::Null => &empty,
            Value::Object(object) => object,
            other => {
                return Err(ToolError::invalid_arguments(format!(
                    "arguments must be an object: expected object, got {}",
                    value_kind(other)
                )));
            }
        };

        if self.permissive {
            return Ok(());
        }

        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ToolError::invalid_arguments(format!(
                        "missing required argument '{}'",
                        field.name
                    )));
                }
                None | Some(Value::Null) => {}
                Some(value) if !field.field_type.accepts(value) => {
                    return Err(ToolError::invalid_arguments(format!(
                        "invalid type for argument '{}': expected {}, got {}",
                        field.name,
                        field.field_type.name(),
                        value_kind(value)
                    )));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Schema advertised to the model.
    pub fn to_json_schema(&self) -> Value {
        if self.permissive {
            return json!({ "type": "object", "additionalProperties": true });
        }

        let mut properties = Map::new();
        for field in &self.fields {
            let mut property = Map::new();
            if field.field_type != FieldType::Any {
                property.insert("type".to_string(), json!(field.field_type.name()));
            }
            if let Some(description) = &field.description {
                property.insert("description".to_string(), json!(description));
            }
            properties.insert(field.name.clone(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ArgumentSchema {
        ArgumentSchema::from_json_schema(&json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Page to fetch" },
                "max_bytes": { "type": "number" },
                "headers": { "type": "object" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "raw": { "type": "boolean" }
            },
            "required": ["url"]
        }))
    }

    #[test]
    fn non_object_schema_degrades_to_permissive() {
        let schema = ArgumentSchema::from_json_schema(&json!({ "type": "string" }));
        assert!(schema.is_permissive());
        assert!(schema.validate(&json!({ "anything": 1 })).is_ok());

        let missing = ArgumentSchema::from_json_schema(&Value::Null);
        assert!(missing.is_permissive());
    }

    #[test]
    fn missing_required_argument_is_reported_by_name() {
        let error = schema()
            .validate(&json!({ "raw": true }))
            .expect_err("url is required");
        assert!(error.message.contains("missing required argument 'url'"));
    }

    #[test]
    fn type_mismatch_names_expected_type() {
        let error = schema()
            .validate(&json!({ "url": "https://a", "max_bytes": "ten" }))
            .expect_err("max_bytes must be numeric");
        assert!(error.message.contains("expected number, got string"));
    }

    #[test]
    fn optional_null_and_unknown_fields_are_accepted() {
        assert!(
            schema()
                .validate(&json!({ "url": "https://a", "headers": null, "extra": 1 }))
                .is_ok()
        );
    }

    #[test]
    fn json_schema_round_trip_keeps_required_and_descriptions() {
        let advertised = schema().to_json_schema();
        assert_eq!(advertised["required"], json!(["url"]));
        assert_eq!(
            advertised["properties"]["url"]["description"],
            json!("Page to fetch")
        );
    }
}
