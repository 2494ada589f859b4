use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub gateway: GatewayConfig,
    pub llm: LLMConfig,
    pub agent: AgentConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub endpoint_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub max_steps: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());

        let config = Config::builder()
            .add_source(File::with_name(&format!("config/{}", config_env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        // A gateway URL is a precondition for every surface; fail before any
        // model or tool work.
        if settings.gateway.endpoint_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "gateway.endpoint_url must be set".to_string(),
            ));
        }

        Ok(settings)
    }

    /// Credential for the CLI surfaces. The HTTP surface takes the key from
    /// the request header instead; it is passed through, never validated
    /// locally.
    pub fn api_key() -> Result<String> {
        env::var("SKYFIRE_API_KEY")
            .map_err(|_| anyhow::anyhow!("SKYFIRE_API_KEY environment variable not set"))
    }
}

/// Settings pointed at a test gateway.
pub fn test_settings(endpoint_url: &str) -> Settings {
    Settings {
        gateway: GatewayConfig {
            endpoint_url: endpoint_url.to_string(),
        },
        llm: LLMConfig {
            model: "gpt-4o".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        },
        agent: AgentConfig { max_steps: 5 },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
        },
    }
}
