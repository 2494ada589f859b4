//! Skychat - chat gateway with schema-driven LLM tool calling
//!
//! Proxies conversation turns to a hosted LLM through the Skyfire metered
//! gateway and augments the model with callable tools: a schema-driven HTTP
//! caller over the Vetric APIs, image display, and email compose/send. The
//! design core is the tool-calling layer: an embedded schema is parsed into
//! an operation catalog, the catalog is exposed to the model as an invocable
//! tool with generated operation names, and model-issued calls are dispatched
//! as outbound HTTP requests with structured, renderable results.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod schema;
pub mod server;
pub mod tools;
pub mod utils;

pub use catalog::{Catalog, CatalogError, PathConvention};
pub use config::Settings;
pub use core::llm::{ChatMessage, GatewayClient};
pub use core::orchestrator::{Orchestrator, TurnEvent};
pub use tools::registry::ToolRegistry;

/// Header carrying the caller's metered-gateway credential. Threaded
/// unchanged from the inbound request through every outbound call; never
/// validated locally.
pub const GATEWAY_API_KEY_HEADER: &str = "skyfire-api-key";
