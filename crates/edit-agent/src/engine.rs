use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::EditError;
use crate::transcript::ChatMessage;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// First candidate reply of a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub text: String,
    pub usage: ChatUsage,
}

impl ChatReply {
    pub fn new(text: String) -> Self {
        Self {
            text,
            usage: ChatUsage::default(),
        }
    }
}

/// Sampling options passed along with every completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            max_tokens: Some(768),
        }
    }
}

/// Chat-completion capability the controller depends on. The runtime behind
/// it is an opaque external collaborator.
#[async_trait]
pub trait ChatEngine: Send + Sync + std::fmt::Debug {
    async fn chat(&self, messages: &[ChatMessage], options: &EngineOptions) -> Result<ChatReply>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub model_id: String,
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_id: crate::DEFAULT_MODEL_ID.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Provides the one-time engine setup step. Loading happens once at
/// startup; a failure leaves the handle permanently unavailable.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    async fn load(&self, config: &EngineConfig) -> Result<Arc<dyn ChatEngine>>;
}

/// Handle to the loaded engine. Availability gates the whole edit cycle:
/// while the handle is empty the controller refuses submissions.
pub struct EngineHandle {
    engine: Option<Arc<dyn ChatEngine>>,
    config: EngineConfig,
}

impl EngineHandle {
    /// Runs the loader once and wraps the outcome. Load failures are
    /// logged and produce an unavailable handle; there is no retry.
    pub async fn load(loader: &dyn EngineLoader, config: EngineConfig) -> Self {
        info!(model = %config.model_id, "loading engine");
        match loader.load(&config).await {
            Ok(engine) => {
                info!(model = %config.model_id, "engine loaded");
                Self {
                    engine: Some(engine),
                    config,
                }
            }
            Err(err) => {
                error!(model = %config.model_id, %err, "failed to load engine");
                Self {
                    engine: None,
                    config,
                }
            }
        }
    }

    /// Handle around an engine that is already running.
    pub fn from_engine(engine: Arc<dyn ChatEngine>, config: EngineConfig) -> Self {
        Self {
            engine: Some(engine),
            config,
        }
    }

    pub fn unavailable(config: EngineConfig) -> Self {
        Self {
            engine: None,
            config,
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> Result<Arc<dyn ChatEngine>, EditError> {
        self.engine.clone().ok_or(EditError::EngineUnavailable)
    }
}
