pub mod defaults;
pub mod paths;
pub mod schema;
pub mod service;
pub mod validation;

pub use paths::AppPaths;
pub use schema::{
    AppConfig, GenerationConfig, LoggingConfig, ModelConfig, ServerConfig, SessionConfig,
};
pub use service::{ConfigError, ConfigService};
