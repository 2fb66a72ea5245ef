//! Shared application state for the HTTP surface and the voice controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::AppConfig;
use crate::db;
use crate::error::ConsultError;
use crate::pipeline::completion::{CompletionClient, CompletionError, HttpCompletionClient};
use crate::pipeline::{ReportGenerator, SpecialistRecommender};
use crate::store::SessionStore;
use crate::voice::{CallStatus, UnconfiguredVoiceBackend, VoiceBackend, VoiceCallController, WebSocketVoiceBackend};

/// Produces a fresh voice backend for each call controller.
pub type VoiceBackendFactory = Arc<dyn Fn() -> Arc<dyn VoiceBackend> + Send + Sync>;

/// Application state, wrapped in `Arc` at startup.
pub struct CoreState {
    pub config: AppConfig,
    store: Arc<SessionStore>,
    recommender: SpecialistRecommender,
    reports: Arc<ReportGenerator>,
    voice_backends: VoiceBackendFactory,
    /// One controller per consultation session, created on first call.
    calls: Mutex<HashMap<String, VoiceCallController>>,
}

impl CoreState {
    pub fn new(
        config: AppConfig,
        store: Arc<SessionStore>,
        llm: Arc<dyn CompletionClient>,
        voice_backends: VoiceBackendFactory,
    ) -> Self {
        Self {
            config,
            recommender: SpecialistRecommender::new(llm.clone()),
            reports: Arc::new(ReportGenerator::new(llm, store.clone())),
            store,
            voice_backends,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Open the database and build the real clients described by `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, CoreError> {
        let store = Arc::new(SessionStore::open(&config.db_path)?);
        let llm: Arc<dyn CompletionClient> = Arc::new(HttpCompletionClient::new(&config.completion)?);

        let backend_config = config.voice_backend.clone();
        let connect_timeout = config.voice_call.connect_timeout;
        if backend_config.url.is_none() {
            tracing::warn!("VOICE_BACKEND_URL not set; voice calls are disabled");
        }
        let voice_backends: VoiceBackendFactory = Arc::new(move || {
            match WebSocketVoiceBackend::from_config(&backend_config, connect_timeout) {
                Some(backend) => Arc::new(backend) as Arc<dyn VoiceBackend>,
                None => Arc::new(UnconfiguredVoiceBackend),
            }
        });

        Ok(Self::new(config, store, llm, voice_backends))
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn recommender(&self) -> &SpecialistRecommender {
        &self.recommender
    }

    pub fn reports(&self) -> &ReportGenerator {
        &self.reports
    }

    /// Controller for the session's voice call, created on first use.
    ///
    /// Controllers of finished calls are dropped here, so the registry only
    /// holds sessions with a live or freshly created call.
    pub fn call_controller(&self, session_id: &str) -> Result<VoiceCallController, ConsultError> {
        let mut calls = self.lock_calls()?;
        calls.retain(|_, controller| !controller.is_finished());
        let controller = calls.entry(session_id.to_string()).or_insert_with(|| {
            VoiceCallController::new(
                (self.voice_backends)(),
                self.reports.clone(),
                self.config.voice_call.clone(),
            )
        });
        Ok(controller.clone())
    }

    /// Controller for the session if it has a call registered.
    pub fn existing_call(&self, session_id: &str) -> Option<VoiceCallController> {
        self.calls.lock().ok()?.get(session_id).cloned()
    }

    /// Forget the session's controller once it is idle again.
    pub fn release_call(&self, session_id: &str) {
        let Ok(mut calls) = self.lock_calls() else {
            return;
        };
        if calls
            .get(session_id)
            .is_some_and(|c| c.status() == CallStatus::Idle)
        {
            calls.remove(session_id);
            tracing::debug!(session_id, "Call controller released");
        }
    }

    /// Number of sessions with a registered call controller.
    pub fn registered_calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    fn lock_calls(&self) -> Result<MutexGuard<'_, HashMap<String, VoiceCallController>>, ConsultError> {
        self.calls
            .lock()
            .map_err(|_| ConsultError::Storage("call registry lock poisoned".into()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Completion client error: {0}")]
    Completion(#[from] CompletionError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// In-memory state with the given completion client and voice backend.
    pub fn core_with(
        llm: Arc<dyn CompletionClient>,
        backend: Arc<dyn VoiceBackend>,
    ) -> Arc<CoreState> {
        let store = Arc::new(SessionStore::in_memory().unwrap());
        let config = AppConfig::from_lookup(|_| None);
        let factory: VoiceBackendFactory = Arc::new(move || backend.clone());
        Arc::new(CoreState::new(config, store, llm, factory))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::core_with;
    use super::*;
    use crate::pipeline::completion::MockCompletionClient;
    use crate::voice::MockVoiceBackend;

    #[test]
    fn controller_reused_per_session() {
        let core = core_with(
            Arc::new(MockCompletionClient::new("[]")),
            Arc::new(MockVoiceBackend::new()),
        );
        assert!(core.existing_call("s-1").is_none());

        let first = core.call_controller("s-1").unwrap();
        let _other = core.call_controller("s-2").unwrap();
        assert!(core.existing_call("s-1").is_some());

        let again = core.call_controller("s-1").unwrap();
        assert_eq!(first.status(), again.status());
        assert_eq!(core.registered_calls(), 2);
    }

    fn core_for_calls(backend: Arc<MockVoiceBackend>) -> Arc<CoreState> {
        core_with(Arc::new(MockCompletionClient::new(REPORT_JSON)), backend)
    }

    const REPORT_JSON: &str = r#"{"chiefComplaint":"Cough","summary":"Patient reports a cough.","severity":"Mild"}"#;

    #[tokio::test]
    async fn registry_empty_after_start_end_cycle() {
        let core = core_for_calls(Arc::new(MockVoiceBackend::new()));
        let session = core
            .store()
            .create_session("ana@example.com", "cough", Some(crate::specialists::first()))
            .unwrap();

        let controller = core.call_controller(&session.session_id).unwrap();
        controller.start_call(session.clone()).await.unwrap();
        assert_eq!(core.registered_calls(), 1);

        // A live call is never released.
        core.release_call(&session.session_id);
        assert_eq!(core.registered_calls(), 1);

        controller.end_call().await.unwrap();
        core.release_call(&session.session_id);
        assert_eq!(core.registered_calls(), 0);
        assert!(core.existing_call(&session.session_id).is_none());
    }

    #[tokio::test]
    async fn remotely_ended_calls_pruned_on_next_registration() {
        let backend = Arc::new(MockVoiceBackend::new());
        let core = core_for_calls(backend.clone());
        let session = core
            .store()
            .create_session("ana@example.com", "cough", Some(crate::specialists::first()))
            .unwrap();

        let controller = core.call_controller(&session.session_id).unwrap();
        controller.start_call(session.clone()).await.unwrap();
        let mut snapshots = controller.subscribe();
        backend.hang_up();
        tokio::time::timeout(
            std::time::Duration::from_secs(5),
            snapshots.wait_for(|s| s.status == CallStatus::Idle),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(controller.is_finished());

        let _fresh = core.call_controller("other-session").unwrap();
        assert!(core.existing_call(&session.session_id).is_none());
        assert_eq!(core.registered_calls(), 1);
    }

    #[test]
    fn from_config_opens_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("medivox.db");
        let path_str = db_path.to_string_lossy().to_string();
        let config = AppConfig::from_lookup(move |key| match key {
            "MEDIVOX_DB_PATH" => Some(path_str.clone()),
            _ => None,
        });

        let core = CoreState::from_config(config).unwrap();
        assert!(db_path.exists());
        assert!(core.store().list_sessions("ana@example.com").unwrap().is_empty());
    }
}
