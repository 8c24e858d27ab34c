use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::paths::AppPaths;
use super::schema::AppConfig;
use super::validation::{validate_config, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Clone)]
pub struct ConfigService {
    paths: Arc<AppPaths>,
}

impl ConfigService {
    pub fn new(paths: Arc<AppPaths>) -> Self {
        Self { paths }
    }

    pub fn config_path(&self) -> PathBuf {
        if let Ok(path) = env::var("CHATBOT_CONFIG_PATH") {
            return PathBuf::from(path);
        }

        let user_config = self.paths.user_data_dir.join("config.yml");
        if user_config.exists() {
            return user_config;
        }

        self.paths.project_root.join("config.yml")
    }

    /// Loads, env-overrides and validates the configuration.
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let path = self.config_path();
        let mut config = load_yaml_file(&path)?;
        apply_env_overrides(&mut config, |key| env::var(key).ok());
        validate_config(&config)?;
        Ok(config)
    }
}

fn load_yaml_file(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if contents.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT").and_then(|val| val.parse::<u16>().ok()) {
        config.server.port = port;
    }
    if let Some(host) = lookup("CHATBOT_HOST").filter(|val| !val.trim().is_empty()) {
        config.server.host = host.trim().to_string();
    }
    if let Some(url) = lookup("CHATBOT_MODEL_SERVER_URL").filter(|val| !val.trim().is_empty()) {
        config.model.server_url = url.trim().to_string();
    }
}
