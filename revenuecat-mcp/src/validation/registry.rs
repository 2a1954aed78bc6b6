//! Static tool → schema registry.

use std::collections::HashMap;

use super::schema::{FieldType, Schema};
use crate::mcp::ToolName;

const PRODUCT_TYPES: &[&str] = &["subscription", "non_consumable", "consumable"];
const EXPERIMENT_STATUSES: &[&str] = &["active", "inactive", "completed"];

fn by_id() -> Schema {
    Schema::new().required("id", FieldType::NON_EMPTY)
}

fn project_by_id() -> Schema {
    Schema::new().required("project_id", FieldType::NON_EMPTY).required("id", FieldType::NON_EMPTY)
}

fn cursor_list() -> Schema {
    Schema::new().optional("cursor", FieldType::NON_EMPTY)
}

fn project_cursor_list() -> Schema {
    Schema::new()
        .required("project_id", FieldType::NON_EMPTY)
        .optional("cursor", FieldType::NON_EMPTY)
}

fn create_offering() -> Schema {
    Schema::new()
        .required("project_id", FieldType::NON_EMPTY)
        .required("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .optional("is_default", FieldType::Boolean)
        .optional("packages", FieldType::IDENTIFIERS)
}

fn update_offering() -> Schema {
    project_by_id()
        .optional("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .optional("is_default", FieldType::Boolean)
        .optional("packages", FieldType::IDENTIFIERS)
}

fn create_entitlement() -> Schema {
    Schema::new()
        .required("identifier", FieldType::NON_EMPTY)
        .required("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .optional("product_identifiers", FieldType::IDENTIFIERS)
}

fn update_entitlement() -> Schema {
    by_id()
        .optional("identifier", FieldType::NON_EMPTY)
        .optional("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .optional("product_identifiers", FieldType::IDENTIFIERS)
}

fn create_product() -> Schema {
    Schema::new()
        .required("project_id", FieldType::NON_EMPTY)
        .required("identifier", FieldType::NON_EMPTY)
        .required("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .required("type", FieldType::Enum { allowed: PRODUCT_TYPES })
        .optional("store_identifiers", FieldType::StringMap { value_min_length: 1 })
}

fn update_product() -> Schema {
    project_by_id()
        .optional("identifier", FieldType::NON_EMPTY)
        .optional("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .optional("type", FieldType::Enum { allowed: PRODUCT_TYPES })
        .optional("store_identifiers", FieldType::StringMap { value_min_length: 1 })
}

fn create_package() -> Schema {
    Schema::new()
        .required("identifier", FieldType::NON_EMPTY)
        .required("name", FieldType::NON_EMPTY)
        .optional("position", FieldType::at_least(0.0))
        .optional("product_identifiers", FieldType::IDENTIFIERS)
}

fn update_package() -> Schema {
    by_id()
        .optional("identifier", FieldType::NON_EMPTY)
        .optional("name", FieldType::NON_EMPTY)
        .optional("position", FieldType::at_least(0.0))
        .optional("product_identifiers", FieldType::IDENTIFIERS)
}

fn create_price_experiment() -> Schema {
    Schema::new()
        .required("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .optional("status", FieldType::Enum { allowed: EXPERIMENT_STATUSES })
        .required("treatment_group_percentage", FieldType::range(0.0, 100.0))
}

fn update_price_experiment() -> Schema {
    by_id()
        .optional("name", FieldType::NON_EMPTY)
        .optional("description", FieldType::TEXT)
        .optional("status", FieldType::Enum { allowed: EXPERIMENT_STATUSES })
        .optional("treatment_group_percentage", FieldType::range(0.0, 100.0))
}

fn schema_of(tool: ToolName) -> Schema {
    match tool {
        ToolName::CreateOffering => create_offering(),
        ToolName::UpdateOffering => update_offering(),
        ToolName::GetOffering
        | ToolName::DeleteOffering
        | ToolName::GetProduct
        | ToolName::DeleteProduct => project_by_id(),
        ToolName::ListOfferings | ToolName::ListProducts => project_cursor_list(),

        ToolName::CreateEntitlement => create_entitlement(),
        ToolName::UpdateEntitlement => update_entitlement(),
        ToolName::GetEntitlement
        | ToolName::DeleteEntitlement
        | ToolName::GetPackage
        | ToolName::DeletePackage
        | ToolName::GetPriceExperiment
        | ToolName::DeletePriceExperiment => by_id(),
        ToolName::ListEntitlements | ToolName::ListPackages | ToolName::ListPriceExperiments => {
            cursor_list()
        }

        ToolName::CreateProduct => create_product(),
        ToolName::UpdateProduct => update_product(),
        ToolName::CreatePackage => create_package(),
        ToolName::UpdatePackage => update_package(),
        ToolName::CreatePriceExperiment => create_price_experiment(),
        ToolName::UpdatePriceExperiment => update_price_experiment(),
    }
}

/// Tool-keyed registry of argument schemas.
///
/// Built once at startup and read-only afterwards; share it by reference or
/// through the [`Validator`](super::Validator) that owns it.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<ToolName, Schema>,
}

impl SchemaRegistry {
    /// Builds the schema of every tool in [`ToolName::ALL`].
    #[must_use]
    pub fn new() -> Self {
        let schemas = ToolName::ALL.iter().map(|&tool| (tool, schema_of(tool))).collect();
        Self { schemas }
    }

    /// Returns the schema registered for `tool`.
    #[must_use]
    pub fn schema_for(&self, tool: ToolName) -> Option<&Schema> {
        self.schemas.get(&tool)
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true when no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
