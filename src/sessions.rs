//! Per-session report state, keyed by session id.
//!
//! Every session gets its own [`ReportSession`] behind its own async mutex.
//! A step holds that lock until it finishes, discovery included, so calls
//! for one session are serialized while other sessions proceed untouched.
//!
//! # Example
//!
//! ```ignore
//! use gallica_mcp::{GallicaClient, ReportConfig, SessionStore};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = SessionStore::new(Arc::new(GallicaClient::with_defaults()), ReportConfig::default());
//!
//! store.process("conversation-1", &json!({"topic": "La Commune de Paris"})).await;
//! store.process("conversation-1", &json!({"searchSources": true})).await;
//! ```

use crate::config::ReportConfig;
use crate::report::{ReportCallbacks, ReportSession, StepOutcome};
use crate::search::SearchService;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to one session.
pub type SessionHandle = Arc<tokio::sync::Mutex<ReportSession>>;

/// Registry of report sessions.
///
/// Cloning is cheap (Arc-based); clones see the same sessions.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
    search: Arc<dyn SearchService>,
    config: ReportConfig,
    callbacks: ReportCallbacks,
}

impl SessionStore {
    /// Create an empty store. New sessions share `search` and `config`.
    pub fn new(search: Arc<dyn SearchService>, config: ReportConfig) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            search,
            config,
            callbacks: ReportCallbacks::default(),
        }
    }

    /// Callbacks installed on every session created from now on.
    pub fn with_callbacks(mut self, callbacks: ReportCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the session for `id`, creating it on first use.
    pub fn session(&self, id: &str) -> SessionHandle {
        self.map()
            .entry(id.to_string())
            .or_insert_with(|| {
                let session = ReportSession::new(self.search.clone(), self.config.clone())
                    .with_callbacks(self.callbacks.clone());
                Arc::new(tokio::sync::Mutex::new(session))
            })
            .clone()
    }

    /// Get an existing session.
    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.map().get(id).cloned()
    }

    /// Run one report step for session `id` with exclusive access.
    pub async fn process(&self, id: &str, input: &Value) -> StepOutcome {
        let handle = self.session(id);
        let mut session = handle.lock().await;
        session.process_section(input).await
    }

    /// Check if a session exists.
    pub fn contains(&self, id: &str) -> bool {
        self.map().contains_key(id)
    }

    /// Drop a session. In-flight steps keep their handle until they finish.
    pub fn remove(&self, id: &str) -> Option<SessionHandle> {
        self.map().remove(id)
    }

    /// Ids of all live sessions.
    pub fn session_ids(&self) -> Vec<String> {
        self.map().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }

    /// Drop every session.
    pub fn clear(&self) {
        self.map().clear();
    }
}
