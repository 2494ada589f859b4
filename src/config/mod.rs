mod settings;

pub use settings::{
    test_settings, AgentConfig, GatewayConfig, LLMConfig, LoggingConfig, ServerConfig, Settings,
};
