//! Operation catalog
//!
//! Turns a schema document into a keyed set of callable operations. Names are
//! generated (`fetch`/`post` + PascalCase service + PascalCase endpoint), so
//! the catalog is the single source of truth for what the model may invoke.
//!
//! Path routing is driven by an explicit [`PathConvention`] rather than
//! guessing from position: a path with no recognizable service segment is a
//! construction error, as is a generated-name collision or a schema that
//! yields no operations at all.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::schema::SchemaDocument;

static VERSION_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^v\d+$").unwrap());

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("schema declares no servers")]
    MissingServer,

    #[error("server url references {{baseUrl}} but no default is defined")]
    UnresolvedBaseUrl,

    #[error("no known service segment in path: {0}")]
    UnroutablePath(String),

    #[error("duplicate generated operation name: {0}")]
    DuplicateOperation(String),

    #[error("schema produced no operations")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
        }
    }

    /// Prefix used in generated operation names.
    pub fn name_prefix(&self) -> &'static str {
        match self {
            HttpMethod::Get => "fetch",
            HttpMethod::Post => "post",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Body,
}

impl ParamLocation {
    fn from_schema(location: &str) -> Self {
        if location == "query" {
            ParamLocation::Query
        } else {
            ParamLocation::Body
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
}

/// One callable remote endpoint, derived from the schema at build time and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: String,
    pub description: String,
    pub service: String,
    pub endpoint: String,
    pub parameters: Vec<Parameter>,
}

/// Per-schema routing strategy: the provider prefix to strip from path
/// segments and the closed set of service names the schema may address.
#[derive(Debug, Clone)]
pub struct PathConvention {
    service_prefix: Option<String>,
    services: Vec<String>,
}

impl PathConvention {
    pub fn new(service_prefix: Option<&str>, services: &[&str]) -> Self {
        Self {
            service_prefix: service_prefix.map(str::to_string),
            services: services.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Convention for the production Vetric schema.
    pub fn vetric() -> Self {
        Self::new(
            Some("vetric-"),
            &["facebook", "twitter", "linkedin", "instagram"],
        )
    }

    fn service_of<'a>(&self, segment: &'a str) -> Option<&'a str> {
        let name = match &self.service_prefix {
            Some(prefix) => segment.strip_prefix(prefix.as_str()).unwrap_or(segment),
            None => segment,
        };
        self.services.iter().any(|s| s == name).then_some(name)
    }

    /// Split a path into `(service, endpoint)`.
    ///
    /// The service is the first segment naming a known service (with the
    /// provider prefix stripped). The endpoint starts after the version
    /// segment when one follows the service, otherwise right after the
    /// service segment itself.
    pub fn parse_path(&self, path: &str) -> Result<(String, String), CatalogError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let (service_idx, service) = segments
            .iter()
            .enumerate()
            .find_map(|(idx, segment)| self.service_of(segment).map(|name| (idx, name)))
            .ok_or_else(|| CatalogError::UnroutablePath(path.to_string()))?;

        let version_idx = segments
            .iter()
            .enumerate()
            .skip(service_idx + 1)
            .find(|(_, segment)| VERSION_SEGMENT.is_match(segment))
            .map(|(idx, _)| idx);

        let start = version_idx.map_or(service_idx + 1, |idx| idx + 1);
        let endpoint = segments[start..].join("/");
        if endpoint.is_empty() {
            return Err(CatalogError::UnroutablePath(path.to_string()));
        }

        Ok((service.to_string(), endpoint))
    }
}

/// Generated operation name: `fetchTwitterTop`, `postFacebookSearchUsers`.
pub fn operation_name(service: &str, endpoint: &str, method: HttpMethod) -> String {
    format!(
        "{}{}{}",
        method.name_prefix(),
        pascal_case(service),
        pascal_case(endpoint)
    )
}

fn pascal_case(text: &str) -> String {
    text.split(['/', '-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// The full operation set for one schema, keyed by generated name.
/// Read-only after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    base_url: String,
    operations: BTreeMap<String, Operation>,
}

impl Catalog {
    pub fn build(
        schema: &SchemaDocument,
        convention: &PathConvention,
    ) -> Result<Self, CatalogError> {
        let base_url = resolve_base_url(schema)?;
        let mut operations = BTreeMap::new();

        for (path, item) in &schema.paths {
            let methods = [
                (HttpMethod::Get, item.get.as_ref()),
                (HttpMethod::Post, item.post.as_ref()),
            ];
            for (method, spec) in methods {
                let Some(spec) = spec else { continue };
                if spec.deprecated {
                    continue;
                }

                let (service, endpoint) = convention.parse_path(path)?;
                let name = operation_name(&service, &endpoint, method);

                let operation = Operation {
                    path: path.clone(),
                    method,
                    operation_id: spec.operation_id.clone(),
                    description: spec.description.clone(),
                    service,
                    endpoint,
                    parameters: spec
                        .parameters
                        .iter()
                        .map(|param| Parameter {
                            name: param.name.clone(),
                            location: ParamLocation::from_schema(&param.location),
                            required: param.required,
                            param_type: param.schema.type_name.clone(),
                            description: param.description.clone(),
                        })
                        .collect(),
                };

                if operations.insert(name.clone(), operation).is_some() {
                    return Err(CatalogError::DuplicateOperation(name));
                }
            }
        }

        if operations.is_empty() {
            return Err(CatalogError::Empty);
        }

        tracing::debug!(operations = operations.len(), "built operation catalog");
        Ok(Self {
            base_url,
            operations,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Operation names in stable (sorted) order.
    pub fn names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Operation)> {
        self.operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Absolute request URL for an operation.
    pub fn request_url(&self, operation: &Operation) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), operation.path)
    }
}

fn resolve_base_url(schema: &SchemaDocument) -> Result<String, CatalogError> {
    let server = schema.servers.first().ok_or(CatalogError::MissingServer)?;

    if server.url.contains("{baseUrl}") {
        let default = server
            .variables
            .get("baseUrl")
            .map(|variable| variable.default.as_str())
            .ok_or(CatalogError::UnresolvedBaseUrl)?;
        return Ok(server.url.replace("{baseUrl}", default));
    }

    Ok(server.url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::vetric_schema;

    fn schema_from(raw: serde_json::Value) -> SchemaDocument {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_parse_path_receivers_form() {
        let convention = PathConvention::vetric();
        let (service, endpoint) = convention
            .parse_path("/v1/receivers/vetric/twitter/top")
            .unwrap();
        assert_eq!(service, "twitter");
        assert_eq!(endpoint, "top");
    }

    #[test]
    fn test_parse_path_proxy_form() {
        let convention = PathConvention::vetric();
        let (service, endpoint) = convention
            .parse_path("/proxy/vetric-facebook/facebook/v1/search/users")
            .unwrap();
        assert_eq!(service, "facebook");
        assert_eq!(endpoint, "search/users");
    }

    #[test]
    fn test_parse_path_bare_form() {
        let convention = PathConvention::vetric();
        let (service, endpoint) = convention.parse_path("/linkedin/people-search").unwrap();
        assert_eq!(service, "linkedin");
        assert_eq!(endpoint, "people-search");
    }

    #[test]
    fn test_parse_path_unroutable() {
        let convention = PathConvention::vetric();
        let result = convention.parse_path("/v1/receivers/unknown/top");
        assert!(matches!(result, Err(CatalogError::UnroutablePath(_))));

        // A service with nothing after it has no endpoint to name.
        let result = convention.parse_path("/v1/receivers/vetric/twitter");
        assert!(matches!(result, Err(CatalogError::UnroutablePath(_))));
    }

    #[test]
    fn test_operation_name_casing() {
        assert_eq!(
            operation_name("linkedin", "people-search", HttpMethod::Get),
            "fetchLinkedinPeopleSearch"
        );
        assert_eq!(
            operation_name("facebook", "search/users", HttpMethod::Post),
            "postFacebookSearchUsers"
        );
    }

    #[test]
    fn test_build_from_production_schema() {
        let schema = vetric_schema().unwrap();
        let catalog = Catalog::build(&schema, &PathConvention::vetric()).unwrap();

        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.base_url(), "https://api-qa.skyfire.xyz");
        assert!(catalog.get("fetchTwitterTop").is_some());
        assert!(catalog.get("fetchLinkedinPeopleSearch").is_some());
        assert!(catalog.get("fetchInstagramPeopleSearch").is_some());
        assert!(catalog.get("postFacebookSearchUsers").is_some());
    }

    #[test]
    fn test_name_prefix_matches_method() {
        let schema = vetric_schema().unwrap();
        let catalog = Catalog::build(&schema, &PathConvention::vetric()).unwrap();

        for (name, operation) in catalog.iter() {
            match operation.method {
                HttpMethod::Get => assert!(name.starts_with("fetch"), "{name}"),
                HttpMethod::Post => assert!(name.starts_with("post"), "{name}"),
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let schema = vetric_schema().unwrap();
        let convention = PathConvention::vetric();
        let first = Catalog::build(&schema, &convention).unwrap();
        let second = Catalog::build(&schema, &convention).unwrap();

        assert_eq!(first.names(), second.names());
        for name in first.names() {
            assert_eq!(first.get(&name), second.get(&name));
        }
    }

    #[test]
    fn test_request_url_join() {
        let schema = schema_from(serde_json::json!({
            "openapi": "3.0.0",
            "servers": [{"url": "https://api.example.com"}],
            "paths": {
                "/twitter/top": {
                    "get": {
                        "deprecated": false,
                        "parameters": [],
                        "description": "top tweets",
                        "operationId": "topTweets"
                    }
                }
            }
        }));
        let catalog = Catalog::build(&schema, &PathConvention::vetric()).unwrap();
        let operation = catalog.get("fetchTwitterTop").unwrap();
        assert_eq!(
            catalog.request_url(operation),
            "https://api.example.com/twitter/top"
        );
    }

    #[test]
    fn test_deprecated_methods_skipped() {
        let schema = schema_from(serde_json::json!({
            "openapi": "3.0.0",
            "servers": [{"url": "https://api.example.com"}],
            "paths": {
                "/twitter/top": {
                    "get": {
                        "deprecated": true,
                        "parameters": [],
                        "description": "gone",
                        "operationId": "topTweets"
                    },
                    "post": {
                        "deprecated": false,
                        "parameters": [],
                        "description": "still here",
                        "operationId": "postTop"
                    }
                }
            }
        }));
        let catalog = Catalog::build(&schema, &PathConvention::vetric()).unwrap();
        assert_eq!(catalog.names(), vec!["postTwitterTop".to_string()]);
    }

    #[test]
    fn test_all_methods_deprecated_is_empty_error() {
        let schema = schema_from(serde_json::json!({
            "openapi": "3.0.0",
            "servers": [{"url": "https://api.example.com"}],
            "paths": {
                "/twitter/top": {
                    "get": {
                        "deprecated": true,
                        "parameters": [],
                        "description": "gone",
                        "operationId": "topTweets"
                    }
                }
            }
        }));
        let result = Catalog::build(&schema, &PathConvention::vetric());
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        // Same service/endpoint/method reachable through two path spellings.
        let schema = schema_from(serde_json::json!({
            "openapi": "3.0.0",
            "servers": [{"url": "https://api.example.com"}],
            "paths": {
                "/twitter/top": {
                    "get": {
                        "deprecated": false,
                        "parameters": [],
                        "description": "top tweets",
                        "operationId": "topTweets"
                    }
                },
                "/v1/receivers/vetric/twitter/top": {
                    "get": {
                        "deprecated": false,
                        "parameters": [],
                        "description": "top tweets again",
                        "operationId": "topTweetsAgain"
                    }
                }
            }
        }));
        let result = Catalog::build(&schema, &PathConvention::vetric());
        assert!(matches!(
            result,
            Err(CatalogError::DuplicateOperation(name)) if name == "fetchTwitterTop"
        ));
    }

    #[test]
    fn test_missing_server_rejected() {
        let schema = schema_from(serde_json::json!({
            "openapi": "3.0.0",
            "servers": [],
            "paths": {}
        }));
        let result = Catalog::build(&schema, &PathConvention::vetric());
        assert!(matches!(result, Err(CatalogError::MissingServer)));
    }

    #[test]
    fn test_unresolved_base_url_rejected() {
        let schema = schema_from(serde_json::json!({
            "openapi": "3.0.0",
            "servers": [{"url": "{baseUrl}"}],
            "paths": {}
        }));
        let result = Catalog::build(&schema, &PathConvention::vetric());
        assert!(matches!(result, Err(CatalogError::UnresolvedBaseUrl)));
    }
}
