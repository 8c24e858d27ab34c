use std::sync::Arc;

use crate::core::config::{AppConfig, AppPaths};
use crate::llm::{DialogueService, LlamaRuntime, ModelRuntime};
use crate::session::SessionStore;

/// Whether the model came up at startup.
///
/// Decided once; a process that starts `Unavailable` stays that way until it
/// is restarted.
#[derive(Clone)]
pub enum ModelStatus {
    Ready(Arc<DialogueService>),
    Unavailable { reason: String },
}

impl ModelStatus {
    fn from_runtime(runtime: Arc<dyn ModelRuntime>, config: &AppConfig) -> Self {
        match DialogueService::new(runtime, &config.generation) {
            Ok(dialogue) => ModelStatus::Ready(Arc::new(dialogue)),
            Err(err) => {
                tracing::error!("Model {} is unusable: {}", config.model.name, err);
                ModelStatus::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Application state shared across all routes and background tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
    pub model: ModelStatus,
}

impl AppState {
    /// Brings up the model runtime.
    ///
    /// A model that fails to load, or whose served context is too small for
    /// the generation budget, is logged and leaves the state degraded rather
    /// than aborting startup.
    pub async fn initialize(paths: &AppPaths, config: AppConfig) -> Arc<Self> {
        let model = match LlamaRuntime::connect(&config.model, paths).await {
            Ok(runtime) => ModelStatus::from_runtime(Arc::new(runtime), &config),
            Err(err) => {
                tracing::error!("Error loading model {}: {}", config.model.name, err);
                ModelStatus::Unavailable {
                    reason: err.to_string(),
                }
            }
        };

        Self::new(config, model)
    }

    pub fn new(config: AppConfig, model: ModelStatus) -> Arc<Self> {
        let sessions = SessionStore::new(config.session.idle_ttl());
        Arc::new(Self {
            config: Arc::new(config),
            sessions,
            model,
        })
    }

    /// Builds state around an already constructed runtime.
    pub fn with_runtime(config: AppConfig, runtime: Arc<dyn ModelRuntime>) -> Arc<Self> {
        let model = ModelStatus::from_runtime(runtime, &config);
        Self::new(config, model)
    }

    pub fn dialogue(&self) -> Option<&DialogueService> {
        match &self.model {
            ModelStatus::Ready(dialogue) => Some(dialogue),
            ModelStatus::Unavailable { .. } => None,
        }
    }
}
