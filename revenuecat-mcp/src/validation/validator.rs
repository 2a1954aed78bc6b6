//! Tool argument validation and sanitization.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::{
    registry::SchemaRegistry,
    schema::{FieldType, Schema},
};
use crate::mcp::{McpError, ToolName};

/// A rejected tool argument.
///
/// `field` names the offending property (`"tool"` for an unknown tool,
/// `"args"` when the arguments are not an object, `"packages/0"` for an
/// array item). `value` holds the rejected value, or `null` when a required
/// field is missing.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Validation failed for field '{field}': {message}")]
pub struct ValidationError {
    /// Path of the offending field.
    pub field: String,
    /// User-facing description of the violation.
    pub message: String,
    /// The rejected value.
    pub value: Value,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self { field: field.into(), message: message.into(), value }
    }

    fn wrong_type(field: &str, ty: &FieldType, value: &Value) -> Self {
        Self::new(field, format!("Must be of type {}", ty.type_name()), value.clone())
    }

    fn wrong_type_name(field: &str, type_name: &str, value: &Value) -> Self {
        Self::new(field, format!("Must be of type {type_name}"), value.clone())
    }

    fn too_short(field: &str, limit: usize, value: &Value) -> Self {
        Self::new(field, format!("Must be at least {limit} characters long"), value.clone())
    }
}

/// Validates tool arguments against the schema registry.
///
/// Schemas are built once in [`Validator::new`]; validation itself never
/// mutates the validator, so one instance can be shared across concurrent
/// calls.
///
/// # Examples
///
/// ```
/// use revenuecat_mcp::validation::Validator;
/// use serde_json::json;
///
/// let validator = Validator::new();
///
/// let args = json!({ "id": "ent_1", "unexpected": true });
/// let sanitized = validator.validate("GetEntitlement", &args).unwrap();
/// assert_eq!(serde_json::Value::Object(sanitized), json!({ "id": "ent_1" }));
///
/// let err = validator.validate("GetEntitlement", &json!({})).unwrap_err();
/// assert_eq!(err.field, "id");
/// assert_eq!(err.message, "Missing required field: id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    registry: SchemaRegistry,
}

impl Validator {
    /// Creates a validator over the full tool registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(SchemaRegistry::new())
    }

    /// Creates a validator over an explicit registry.
    #[must_use]
    pub const fn with_registry(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Registry backing this validator.
    #[must_use]
    pub const fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validates and sanitizes `args` for the tool named `tool_name`.
    ///
    /// On success the returned map holds exactly the declared fields that
    /// were supplied. Undeclared fields are dropped and absent optional
    /// fields stay absent.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: unknown tool, non-object
    /// arguments, a missing required field, or a field constraint failure.
    pub fn validate(
        &self,
        tool_name: &str,
        args: &Value,
    ) -> Result<Map<String, Value>, ValidationError> {
        self.validate_call(tool_name, args).map(|(_, sanitized)| sanitized)
    }

    /// Resolves `tool_name` and validates `args` for it in one step.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn validate_call(
        &self,
        tool_name: &str,
        args: &Value,
    ) -> Result<(ToolName, Map<String, Value>), ValidationError> {
        let tool = tool_name.parse::<ToolName>().map_err(|e| {
            ValidationError::new("tool", e.to_string(), Value::String(tool_name.to_owned()))
        })?;
        Ok((tool, self.validate_tool(tool, args)?))
    }

    /// Validates and sanitizes `args` for an already-parsed tool.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn validate_tool(
        &self,
        tool: ToolName,
        args: &Value,
    ) -> Result<Map<String, Value>, ValidationError> {
        let schema = self.registry.schema_for(tool).ok_or_else(|| {
            ValidationError::new(
                "tool",
                format!("Unknown tool: {tool}"),
                Value::String(tool.as_str().to_owned()),
            )
        })?;

        validate_against(schema, args).inspect_err(|err| {
            debug!(tool = %tool, field = %err.field, "tool arguments rejected");
        })
    }

    /// Like [`Validator::validate`], but reports rejections as MCP errors.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidInput`](crate::mcp::ErrorKind::InvalidInput)
    /// error whose data holds the offending `field` and `value`.
    pub fn validate_or_mcp_error(
        &self,
        tool_name: &str,
        args: &Value,
    ) -> Result<Map<String, Value>, McpError> {
        self.validate_call_or_mcp_error(tool_name, args).map(|(_, sanitized)| sanitized)
    }

    /// Like [`Validator::validate_call`], but reports rejections as MCP
    /// errors.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate_or_mcp_error`].
    pub fn validate_call_or_mcp_error(
        &self,
        tool_name: &str,
        args: &Value,
    ) -> Result<(ToolName, Map<String, Value>), McpError> {
        self.validate_call(tool_name, args).map_err(McpError::from)
    }
}

/// Validates `args` against a single schema.
///
/// Required fields are checked first, then every supplied field in
/// declaration order.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_against(
    schema: &Schema,
    args: &Value,
) -> Result<Map<String, Value>, ValidationError> {
    let Some(object) = args.as_object() else {
        return Err(ValidationError::new(
            "args",
            "Arguments must be a non-null object",
            args.clone(),
        ));
    };

    if let Some(missing) = schema.required_fields().find(|name| !object.contains_key(*name)) {
        return Err(ValidationError::new(
            missing,
            format!("Missing required field: {missing}"),
            Value::Null,
        ));
    }

    let mut sanitized = Map::new();
    for field in schema.fields() {
        let Some(value) = object.get(field.name) else {
            continue;
        };

        if value.is_null() {
            if !field.nullable {
                return Err(ValidationError::wrong_type(field.name, &field.ty, value));
            }
        } else {
            check_value(field.name, &field.ty, value)?;
        }

        sanitized.insert(field.name.to_owned(), value.clone());
    }

    Ok(sanitized)
}

fn check_value(path: &str, ty: &FieldType, value: &Value) -> Result<(), ValidationError> {
    match ty {
        FieldType::String { min_length } => check_string(path, *min_length, value),
        FieldType::Number { minimum, maximum } => {
            let Some(number) = value.as_f64() else {
                return Err(ValidationError::wrong_type(path, ty, value));
            };
            if let Some(min) = minimum
                && number < *min
            {
                return Err(ValidationError::new(
                    path,
                    format!("Must be at least {min}"),
                    value.clone(),
                ));
            }
            if let Some(max) = maximum
                && number > *max
            {
                return Err(ValidationError::new(
                    path,
                    format!("Must be at most {max}"),
                    value.clone(),
                ));
            }
            Ok(())
        }
        FieldType::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(ValidationError::wrong_type(path, ty, value))
            }
        }
        FieldType::StringArray { item_min_length } => {
            let Some(items) = value.as_array() else {
                return Err(ValidationError::wrong_type(path, ty, value));
            };
            items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| check_string(&format!("{path}/{i}"), *item_min_length, item))
        }
        FieldType::StringMap { value_min_length } => {
            let Some(entries) = value.as_object() else {
                return Err(ValidationError::wrong_type(path, ty, value));
            };
            entries
                .iter()
                .try_for_each(|(key, entry)| {
                    check_string(&format!("{path}/{key}"), *value_min_length, entry)
                })
        }
        FieldType::Enum { allowed } => {
            let Some(s) = value.as_str() else {
                return Err(ValidationError::wrong_type(path, ty, value));
            };
            if allowed.contains(&s) {
                Ok(())
            } else {
                Err(ValidationError::new(
                    path,
                    format!("Must be one of: {}", allowed.join(", ")),
                    value.clone(),
                ))
            }
        }
    }
}

fn check_string(path: &str, min_length: usize, value: &Value) -> Result<(), ValidationError> {
    let Some(s) = value.as_str() else {
        return Err(ValidationError::wrong_type_name(path, "string", value));
    };
    if s.chars().count() < min_length {
        return Err(ValidationError::too_short(path, min_length, value));
    }
    Ok(())
}
