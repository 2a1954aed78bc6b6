//! MCP tool identifiers and descriptors.

use std::{fmt, str::FromStr};

use serde::Serialize;
use serde_json::Value;

use crate::validation::SchemaRegistry;

macro_rules! tool_names {
    ($($variant:ident => $description:literal,)+) => {
        /// The closed set of tools exposed to MCP clients.
        ///
        /// Each variant's wire name is its identifier (e.g. `"CreateOffering"`).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ToolName {
            $(
                #[doc = $description]
                $variant,
            )+
        }

        impl ToolName {
            /// Every tool, in registration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Wire name of the tool.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            /// Human-readable description shown in `tools/list`.
            #[must_use]
            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }
        }

        impl FromStr for ToolName {
            type Err = UnknownTool;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $(stringify!($variant) => Ok(Self::$variant),)+
                    _ => Err(UnknownTool(s.to_owned())),
                }
            }
        }
    };
}

tool_names! {
    CreateOffering => "Create an offering in a project.",
    GetOffering => "Get an offering by ID.",
    UpdateOffering => "Update an offering.",
    DeleteOffering => "Delete an offering.",
    ListOfferings => "List the offerings of a project.",
    CreateEntitlement => "Create an entitlement.",
    GetEntitlement => "Get an entitlement by ID.",
    UpdateEntitlement => "Update an entitlement.",
    DeleteEntitlement => "Delete an entitlement.",
    ListEntitlements => "List entitlements.",
    CreateProduct => "Create a product in a project.",
    GetProduct => "Get a product by ID.",
    UpdateProduct => "Update a product.",
    DeleteProduct => "Delete a product.",
    ListProducts => "List the products of a project.",
    CreatePackage => "Create a package.",
    GetPackage => "Get a package by ID.",
    UpdatePackage => "Update a package.",
    DeletePackage => "Delete a package.",
    ListPackages => "List packages.",
    CreatePriceExperiment => "Create a price experiment.",
    GetPriceExperiment => "Get a price experiment by ID.",
    UpdatePriceExperiment => "Update a price experiment.",
    DeletePriceExperiment => "Delete a price experiment.",
    ListPriceExperiments => "List price experiments.",
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool name outside [`ToolName::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

/// Tool entry returned by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    /// Wire name.
    pub name: &'static str,
    /// Description for the model.
    pub description: &'static str,
    /// JSON Schema of the arguments.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Builds the `tools/list` entries from the schema registry.
#[must_use]
pub fn tool_descriptors(registry: &SchemaRegistry) -> Vec<ToolDescriptor> {
    ToolName::ALL
        .iter()
        .filter_map(|&tool| {
            registry.schema_for(tool).map(|schema| ToolDescriptor {
                name: tool.as_str(),
                description: tool.description(),
                input_schema: schema.to_json_schema(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_round_trips_through_wire_name() {
        for &tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>(), Ok(tool));
        }
    }

    #[test]
    fn test_tool_count() {
        assert_eq!(ToolName::ALL.len(), 25);
    }

    #[test]
    fn test_unknown_tool() {
        let err = "DropDatabase".parse::<ToolName>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: DropDatabase");
    }

    #[test]
    fn test_tool_names_are_case_sensitive() {
        assert!("getentitlement".parse::<ToolName>().is_err());
    }

    #[test]
    fn test_descriptors_cover_every_tool() {
        let registry = SchemaRegistry::new();
        let descriptors = tool_descriptors(&registry);
        assert_eq!(descriptors.len(), ToolName::ALL.len());

        let get = descriptors.iter().find(|d| d.name == "GetEntitlement").unwrap();
        assert_eq!(get.input_schema["required"], serde_json::json!(["id"]));

        let json = serde_json::to_value(get).unwrap();
        assert!(json.get("inputSchema").is_some());
    }
}
