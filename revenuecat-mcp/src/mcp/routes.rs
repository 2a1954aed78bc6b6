//! Tool → HTTP request routing.
//!
//! Every tool maps onto one REST call. Identifiers that address a resource
//! (`project_id`, `id`) are moved from the arguments into the path as
//! percent-encoded segments; list tools turn `cursor` into a query
//! parameter; everything else left in the sanitized arguments becomes the
//! JSON body of create and update calls.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::{Map, Value};

use super::ToolName;
use crate::{
    error::{Result, RevenueCatError},
    transport::HttpMethod,
    validation::ValidationError,
};

/// Bytes escaped inside one path segment: controls, space, `%`, and the
/// delimiters that would end or split the segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Operation performed on a resource collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Get,
    Update,
    Delete,
    List,
}

/// Resource collection and how it is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Resource {
    collection: &'static str,
    project_scoped: bool,
    update_method: HttpMethod,
}

const ENTITLEMENTS: Resource =
    Resource { collection: "entitlements", project_scoped: false, update_method: HttpMethod::Patch };
const OFFERINGS: Resource =
    Resource { collection: "offerings", project_scoped: true, update_method: HttpMethod::Patch };
const PRODUCTS: Resource =
    Resource { collection: "products", project_scoped: true, update_method: HttpMethod::Patch };
const PACKAGES: Resource =
    Resource { collection: "packages", project_scoped: false, update_method: HttpMethod::Put };
const PRICE_EXPERIMENTS: Resource = Resource {
    collection: "price-experiments",
    project_scoped: false,
    update_method: HttpMethod::Put,
};

const fn target(tool: ToolName) -> (Resource, Action) {
    use Action::{Create, Delete, Get, List, Update};
    match tool {
        ToolName::CreateEntitlement => (ENTITLEMENTS, Create),
        ToolName::GetEntitlement => (ENTITLEMENTS, Get),
        ToolName::UpdateEntitlement => (ENTITLEMENTS, Update),
        ToolName::DeleteEntitlement => (ENTITLEMENTS, Delete),
        ToolName::ListEntitlements => (ENTITLEMENTS, List),
        ToolName::CreateOffering => (OFFERINGS, Create),
        ToolName::GetOffering => (OFFERINGS, Get),
        ToolName::UpdateOffering => (OFFERINGS, Update),
        ToolName::DeleteOffering => (OFFERINGS, Delete),
        ToolName::ListOfferings => (OFFERINGS, List),
        ToolName::CreateProduct => (PRODUCTS, Create),
        ToolName::GetProduct => (PRODUCTS, Get),
        ToolName::UpdateProduct => (PRODUCTS, Update),
        ToolName::DeleteProduct => (PRODUCTS, Delete),
        ToolName::ListProducts => (PRODUCTS, List),
        ToolName::CreatePackage => (PACKAGES, Create),
        ToolName::GetPackage => (PACKAGES, Get),
        ToolName::UpdatePackage => (PACKAGES, Update),
        ToolName::DeletePackage => (PACKAGES, Delete),
        ToolName::ListPackages => (PACKAGES, List),
        ToolName::CreatePriceExperiment => (PRICE_EXPERIMENTS, Create),
        ToolName::GetPriceExperiment => (PRICE_EXPERIMENTS, Get),
        ToolName::UpdatePriceExperiment => (PRICE_EXPERIMENTS, Update),
        ToolName::DeletePriceExperiment => (PRICE_EXPERIMENTS, Delete),
        ToolName::ListPriceExperiments => (PRICE_EXPERIMENTS, List),
    }
}

/// A fully resolved upstream request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the API base, starting with `/`.
    pub path: String,
    /// JSON body for create and update calls.
    pub body: Option<Value>,
    /// Query parameters (pagination cursor).
    pub query: Vec<(String, String)>,
}

/// Resolves sanitized tool arguments into a [`RequestPlan`].
///
/// # Errors
///
/// Returns [`RevenueCatError::Validation`] naming the field if an addressing
/// identifier is missing, not a string, empty, or a dot segment (`.`, `..`).
///
/// # Examples
///
/// ```
/// use revenuecat_mcp::{
///     mcp::{ToolName, route},
///     transport::HttpMethod,
/// };
/// use serde_json::json;
///
/// let args = json!({ "project_id": "proj1", "id": "ofrng1", "name": "Spring" });
/// let plan = route(ToolName::UpdateOffering, args.as_object().unwrap().clone()).unwrap();
///
/// assert_eq!(plan.method, HttpMethod::Patch);
/// assert_eq!(plan.path, "/projects/proj1/offerings/ofrng1");
/// assert_eq!(plan.body, Some(json!({ "name": "Spring" })));
/// ```
pub fn route(tool: ToolName, mut args: Map<String, Value>) -> Result<RequestPlan> {
    let (resource, action) = target(tool);

    let mut path = String::new();
    if resource.project_scoped {
        let project_id = take_segment(&mut args, "project_id")?;
        path.push_str("/projects/");
        path.extend(utf8_percent_encode(&project_id, SEGMENT));
    }
    path.push('/');
    path.push_str(resource.collection);

    if matches!(action, Action::Get | Action::Update | Action::Delete) {
        let id = take_segment(&mut args, "id")?;
        path.push('/');
        path.extend(utf8_percent_encode(&id, SEGMENT));
    }

    let (method, body, query) = match action {
        Action::Create => (HttpMethod::Post, Some(Value::Object(args)), Vec::new()),
        Action::Update => (resource.update_method, Some(Value::Object(args)), Vec::new()),
        Action::Get => (HttpMethod::Get, None, Vec::new()),
        Action::Delete => (HttpMethod::Delete, None, Vec::new()),
        Action::List => {
            let query = match args.remove("cursor") {
                Some(Value::String(cursor)) => vec![("cursor".to_owned(), cursor)],
                _ => Vec::new(),
            };
            (HttpMethod::Get, None, query)
        }
    };

    Ok(RequestPlan { method, path, body, query })
}

fn take_segment(args: &mut Map<String, Value>, field: &str) -> Result<String> {
    match args.remove(field) {
        Some(Value::String(segment)) if matches!(segment.as_str(), "" | "." | "..") => {
            Err(invalid_segment(field, "Must be a resource identifier", Value::String(segment)))
        }
        Some(Value::String(segment)) => Ok(segment),
        Some(other) => Err(invalid_segment(field, "Must be of type string", other)),
        None => {
            Err(invalid_segment(field, &format!("Missing required field: {field}"), Value::Null))
        }
    }
}

fn invalid_segment(field: &str, message: &str, value: Value) -> RevenueCatError {
    RevenueCatError::Validation(ValidationError::new(field, message, value))
}
