//! Restricted OpenAPI schema model
//!
//! Only the subset the gateway exposes is modeled: one server entry with an
//! optional `{baseUrl}` variable, and `get`/`post` operations per path. Other
//! HTTP methods present in a schema document are ignored by construction.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Embedded production schema for the Vetric social-search APIs.
static VETRIC_SCHEMA_JSON: &str = include_str!("vetric.json");

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    /// Informational only; never interpreted.
    pub openapi: String,
    #[serde(default)]
    pub servers: Vec<Server>,
    pub paths: BTreeMap<String, PathItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub variables: BTreeMap<String, ServerVariable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerVariable {
    pub default: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    pub get: Option<MethodSpec>,
    pub post: Option<MethodSpec>,
}

/// One method entry under a path. A present method without a `parameters`
/// array is a schema-authoring error and fails deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodSpec {
    #[serde(default)]
    pub deprecated: bool,
    pub parameters: Vec<ParameterSpec>,
    pub description: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: ParameterType,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterType {
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Parse the embedded Vetric schema.
///
/// Parsed fresh on each call; the catalog built from it is per-request
/// anyway, so a malformed asset surfaces at request start instead of being
/// swallowed into an empty catalog.
pub fn vetric_schema() -> Result<SchemaDocument> {
    serde_json::from_str(VETRIC_SCHEMA_JSON).context("malformed embedded Vetric schema")
}
