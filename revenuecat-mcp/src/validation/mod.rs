//! Schema-driven validation of MCP tool arguments.
//!
//! Every tool has exactly one closed-world [`Schema`]. The [`Validator`]
//! checks raw, untrusted arguments against it before any request is sent
//! upstream:
//!
//! - arguments must be a JSON object
//! - required fields must be present
//! - declared fields must match their type, length, range and enum constraints
//! - undeclared fields are removed, so caller-supplied properties never reach
//!   the RevenueCat API
//!
//! Rejections carry the offending field and value so the model can correct
//! its call.

mod registry;
mod schema;
mod validator;

#[cfg(test)]
#[path = "tests/proptest_sanitize.rs"]
mod proptest_sanitize;

pub use registry::SchemaRegistry;
pub use schema::{FieldDef, FieldType, Schema};
pub use validator::{ValidationError, Validator, validate_against};
