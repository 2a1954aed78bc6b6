//! Field constraint trees for tool argument schemas.
//!
//! A [`Schema`] is an ordered list of [`FieldDef`]s. Each field carries a
//! [`FieldType`] describing the accepted JSON shape plus `required` and
//! `nullable` flags. Schemas are closed-world: any property not declared here
//! is removed from validated input.

use serde_json::{Map, Value, json};

/// Accepted JSON shape and constraints for a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// JSON string with a minimum length in characters.
    String {
        /// Minimum number of characters (0 disables the check).
        min_length: usize,
    },
    /// JSON number with optional inclusive bounds.
    Number {
        /// Inclusive lower bound.
        minimum: Option<f64>,
        /// Inclusive upper bound.
        maximum: Option<f64>,
    },
    /// JSON boolean.
    Boolean,
    /// JSON array whose items are strings.
    StringArray {
        /// Minimum length of every item.
        item_min_length: usize,
    },
    /// JSON object whose values are strings.
    StringMap {
        /// Minimum length of every value.
        value_min_length: usize,
    },
    /// JSON string drawn from a fixed set.
    Enum {
        /// Allowed values, in the order they are reported.
        allowed: &'static [&'static str],
    },
}

impl FieldType {
    /// Non-empty string.
    pub const NON_EMPTY: Self = Self::String { min_length: 1 };

    /// Free-form string, may be empty.
    pub const TEXT: Self = Self::String { min_length: 0 };

    /// Array of non-empty strings.
    pub const IDENTIFIERS: Self = Self::StringArray { item_min_length: 1 };

    /// Number within `[minimum, maximum]`.
    #[must_use]
    pub const fn range(minimum: f64, maximum: f64) -> Self {
        Self::Number { minimum: Some(minimum), maximum: Some(maximum) }
    }

    /// Number no smaller than `minimum`.
    #[must_use]
    pub const fn at_least(minimum: f64) -> Self {
        Self::Number { minimum: Some(minimum), maximum: None }
    }

    /// JSON type name used in validation messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } | Self::Enum { .. } => "string",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::StringArray { .. } => "array",
            Self::StringMap { .. } => "object",
        }
    }

    fn to_json_schema(&self, nullable: bool) -> Value {
        let mut schema = match self {
            Self::String { min_length } => {
                let mut s = json!({ "type": "string" });
                if *min_length > 0 {
                    s["minLength"] = json!(min_length);
                }
                s
            }
            Self::Number { minimum, maximum } => {
                let mut s = json!({ "type": "number" });
                if let Some(min) = minimum {
                    s["minimum"] = json!(min);
                }
                if let Some(max) = maximum {
                    s["maximum"] = json!(max);
                }
                s
            }
            Self::Boolean => json!({ "type": "boolean" }),
            Self::StringArray { item_min_length } => json!({
                "type": "array",
                "items": { "type": "string", "minLength": item_min_length },
            }),
            Self::StringMap { value_min_length } => json!({
                "type": "object",
                "additionalProperties": { "type": "string", "minLength": value_min_length },
            }),
            Self::Enum { allowed } => json!({ "type": "string", "enum": allowed }),
        };
        if nullable {
            schema["nullable"] = Value::Bool(true);
        }
        schema
    }
}

/// A declared field of a tool schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Property name.
    pub name: &'static str,
    /// Accepted shape.
    pub ty: FieldType,
    /// Whether the property must be present.
    pub required: bool,
    /// Whether an explicit `null` is accepted.
    pub nullable: bool,
}

/// Closed-world argument schema for one tool.
///
/// # Examples
///
/// ```
/// use revenuecat_mcp::validation::{FieldType, Schema};
///
/// let schema = Schema::new()
///     .required("id", FieldType::NON_EMPTY)
///     .optional("cursor", FieldType::NON_EMPTY);
///
/// assert_eq!(schema.required_fields().collect::<Vec<_>>(), vec!["id"]);
/// assert!(schema.field("cursor").is_some_and(|f| f.nullable));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a required, non-nullable field.
    #[must_use]
    pub fn required(self, name: &'static str, ty: FieldType) -> Self {
        self.field_with(FieldDef { name, ty, required: true, nullable: false })
    }

    /// Adds an optional field that also accepts `null`.
    #[must_use]
    pub fn optional(self, name: &'static str, ty: FieldType) -> Self {
        self.field_with(FieldDef { name, ty, required: false, nullable: true })
    }

    /// Adds an optional field that rejects `null`.
    #[must_use]
    pub fn optional_non_null(self, name: &'static str, ty: FieldType) -> Self {
        self.field_with(FieldDef { name, ty, required: false, nullable: false })
    }

    /// Adds a fully specified field, replacing an earlier one of the same name.
    #[must_use]
    pub fn field_with(mut self, field: FieldDef) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    /// Declared fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Looks up a declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of required fields in declaration order.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.required).map(|f| f.name)
    }

    /// Renders the schema as a JSON Schema object for `tools/list`.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_owned(), f.ty.to_json_schema(f.nullable)))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_fields().collect::<Vec<_>>(),
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_declaration_order() {
        let schema = Schema::new()
            .required("project_id", FieldType::NON_EMPTY)
            .required("id", FieldType::NON_EMPTY)
            .optional("name", FieldType::NON_EMPTY);

        let names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
        assert_eq!(names, ["project_id", "id", "name"]);
        assert_eq!(schema.required_fields().collect::<Vec<_>>(), ["project_id", "id"]);
    }

    #[test]
    fn test_field_with_replaces_existing() {
        let schema = Schema::new()
            .optional("name", FieldType::NON_EMPTY)
            .required("name", FieldType::TEXT);

        assert_eq!(schema.fields().len(), 1);
        let field = schema.field("name").unwrap();
        assert!(field.required);
        assert_eq!(field.ty, FieldType::TEXT);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FieldType::NON_EMPTY.type_name(), "string");
        assert_eq!(FieldType::range(0.0, 100.0).type_name(), "number");
        assert_eq!(FieldType::Boolean.type_name(), "boolean");
        assert_eq!(FieldType::IDENTIFIERS.type_name(), "array");
        assert_eq!(FieldType::StringMap { value_min_length: 1 }.type_name(), "object");
        assert_eq!(FieldType::Enum { allowed: &["a"] }.type_name(), "string");
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = Schema::new()
            .required("name", FieldType::NON_EMPTY)
            .optional("status", FieldType::Enum { allowed: &["active", "inactive"] })
            .required("treatment_group_percentage", FieldType::range(0.0, 100.0));

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["additionalProperties"], false);
        assert_eq!(rendered["required"], json!(["name", "treatment_group_percentage"]));
        assert_eq!(rendered["properties"]["name"]["minLength"], 1);
        assert_eq!(rendered["properties"]["status"]["enum"], json!(["active", "inactive"]));
        assert_eq!(rendered["properties"]["status"]["nullable"], true);
        assert_eq!(rendered["properties"]["treatment_group_percentage"]["maximum"], 100.0);
        assert!(rendered["properties"]["treatment_group_percentage"].get("nullable").is_none());
    }

    #[test]
    fn test_text_has_no_min_length() {
        let schema = Schema::new().optional("description", FieldType::TEXT);
        let rendered = schema.to_json_schema();
        assert!(rendered["properties"]["description"].get("minLength").is_none());
    }
}
