//! Chooses which chat engine backs the edit cycle: the locally loaded
//! model runtime, or a scripted engine that plays back canned replies for
//! offline runs and tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use edit_agent::{ChatEngine, ChatMessage, ChatReply, EngineHandle, EngineOptions};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Provider {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "scripted")]
    Scripted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingPolicy {
    #[serde(default = "RoutingPolicy::default_prefer_local")]
    pub prefer_local: bool,
    #[serde(default)]
    pub offline_only: bool,
    #[serde(default)]
    pub force_provider: Option<Provider>,
}

impl RoutingPolicy {
    fn default_prefer_local() -> bool {
        true
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            prefer_local: true,
            offline_only: false,
            force_provider: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("requested provider is unavailable: {0:?}")]
    ProviderUnavailable(Provider),
}

/// Engine that answers from a fixed reply queue. Stands in for the model
/// runtime when running offline; also the workhorse of the test suites.
#[derive(Debug)]
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_replies(replies: impl IntoIterator<Item = String>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply.into());
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatEngine for ScriptedEngine {
    async fn chat(&self, _messages: &[ChatMessage], _options: &EngineOptions) -> Result<ChatReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .map_err(|_| anyhow!("scripted reply queue poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow!("scripted engine has no replies left"))?;
        Ok(ChatReply::new(reply))
    }
}

#[derive(Clone)]
pub struct EngineRouter {
    local: Option<Arc<dyn ChatEngine>>,
    scripted: Option<Arc<ScriptedEngine>>,
}

impl EngineRouter {
    pub fn new(local: EngineHandle) -> Self {
        Self {
            local: local.engine().ok(),
            scripted: None,
        }
    }

    pub fn with_scripted(mut self, scripted: Arc<ScriptedEngine>) -> Self {
        self.scripted = Some(scripted);
        self
    }

    pub fn route(&self, policy: RoutingPolicy) -> Result<Arc<dyn ChatEngine>> {
        if let Some(provider) = policy.force_provider {
            return self.provider(provider);
        }
        if policy.offline_only {
            return self.provider(Provider::Scripted);
        }
        if policy.prefer_local {
            if let Ok(engine) = self.provider(Provider::Local) {
                return Ok(engine);
            }
        }
        self.provider(Provider::Scripted)
            .or_else(|_| self.provider(Provider::Local))
    }

    pub fn is_provider_available(&self, provider: Provider) -> bool {
        match provider {
            Provider::Local => self.local.is_some(),
            Provider::Scripted => self.scripted.is_some(),
        }
    }

    pub fn local_available(&self) -> bool {
        self.is_provider_available(Provider::Local)
    }

    fn provider(&self, provider: Provider) -> Result<Arc<dyn ChatEngine>> {
        let engine: Option<Arc<dyn ChatEngine>> = match provider {
            Provider::Local => self.local.clone(),
            Provider::Scripted => self
                .scripted
                .clone()
                .map(|engine| engine as Arc<dyn ChatEngine>),
        };
        engine.ok_or_else(|| anyhow!(RouterError::ProviderUnavailable(provider)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edit_agent::EngineConfig;

    fn offline_router() -> EngineRouter {
        let local = EngineHandle::unavailable(EngineConfig::default());
        EngineRouter::new(local).with_scripted(Arc::new(ScriptedEngine::with_replies([
            r#"{"html":"<p>hi</p>","css":"p{color:red}"}"#.to_string(),
        ])))
    }

    #[test]
    fn falls_back_to_scripted_when_local_is_unavailable() {
        let router = offline_router();
        assert!(!router.local_available());
        assert!(router.route(RoutingPolicy::default()).is_ok());
    }

    #[test]
    fn forcing_an_unavailable_provider_fails() {
        let router = offline_router();
        let policy = RoutingPolicy {
            force_provider: Some(Provider::Local),
            ..RoutingPolicy::default()
        };
        let err = router.route(policy).unwrap_err();
        assert!(err.downcast_ref::<RouterError>().is_some());
    }

    #[tokio::test]
    async fn scripted_engine_plays_replies_in_order() {
        let engine = ScriptedEngine::with_replies(["one".to_string(), "two".to_string()]);
        let options = EngineOptions::default();
        let first = engine.chat(&[], &options).await.unwrap();
        let second = engine.chat(&[], &options).await.unwrap();
        assert_eq!(first.text, "one");
        assert_eq!(second.text, "two");
        assert_eq!(engine.call_count(), 2);
        assert!(engine.chat(&[], &options).await.is_err());
    }
}
