//! Voice dialogue controller.
//!
//! `Idle -> Connecting -> Connected -> Disconnecting -> Idle`. One call at a
//! time per controller. The call owns one timer and one event pump; both are
//! torn down before the report is generated.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::backend::VoiceBackend;
use super::timer::CallTimer;
use super::types::{
    format_elapsed, AssistantConfig, CallOutcome, CallSnapshot, CallState, CallStatus, EndReason,
    TranscriptKind, VoiceEvent,
};
use crate::config::VoiceCallConfig;
use crate::error::ConsultError;
use crate::models::{ConsultationSession, TranscriptEntry, TranscriptRole};
use crate::pipeline::ReportGenerator;

#[derive(Clone)]
pub struct VoiceCallController {
    shared: Arc<Shared>,
}

struct Shared {
    backend: Arc<dyn VoiceBackend>,
    reports: Arc<ReportGenerator>,
    call_config: VoiceCallConfig,
    inner: Mutex<CallInner>,
    snapshots: watch::Sender<CallSnapshot>,
}

#[derive(Default)]
struct CallInner {
    state: CallState,
    session: Option<ConsultationSession>,
    transcript: Vec<TranscriptEntry>,
    /// Bumped on every start so stale ticks and events are recognisable.
    generation: u64,
    timer: Option<CallTimer>,
    pump: Option<JoinHandle<()>>,
    last_outcome: Option<CallOutcome>,
}

impl CallInner {
    fn snapshot(&self) -> CallSnapshot {
        CallSnapshot {
            session_id: self.session.as_ref().map(|s| s.session_id.clone()),
            status: self.state.status,
            elapsed_seconds: self.state.elapsed_seconds,
            elapsed: format_elapsed(self.state.elapsed_seconds),
            live_role: self.state.live_role,
            live_partial_text: self.state.live_partial_text.clone(),
            transcript_len: self.transcript.len(),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.state.status == CallStatus::Connected
    }
}

impl VoiceCallController {
    pub fn new(
        backend: Arc<dyn VoiceBackend>,
        reports: Arc<ReportGenerator>,
        call_config: VoiceCallConfig,
    ) -> Self {
        let (snapshots, _) = watch::channel(CallSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                reports,
                call_config,
                inner: Mutex::new(CallInner::default()),
                snapshots,
            }),
        }
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<CallSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> CallSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    pub fn status(&self) -> CallStatus {
        self.snapshot().status
    }

    /// Finalized transcript of the current (or just-ended) call.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.shared
            .lock()
            .map(|inner| inner.transcript.clone())
            .unwrap_or_default()
    }

    /// Outcome of the most recent call teardown, whoever initiated it.
    pub fn last_outcome(&self) -> Option<CallOutcome> {
        self.shared.lock().ok().and_then(|inner| inner.last_outcome.clone())
    }

    /// Back in `Idle` after a completed call.
    pub fn is_finished(&self) -> bool {
        self.shared
            .lock()
            .map(|inner| inner.state.status == CallStatus::Idle && inner.last_outcome.is_some())
            .unwrap_or(false)
    }

    /// Open a voice call for `session` with its bound specialist.
    ///
    /// Returns once the backend reports the call as started. On backend
    /// failure or connect timeout the controller is back in `Idle` and the
    /// error is `UpstreamServiceFailure`.
    pub async fn start_call(&self, session: ConsultationSession) -> Result<(), ConsultError> {
        let assistant =
            AssistantConfig::for_specialist(&self.shared.call_config, &session.selected_specialist);
        let session_id = session.session_id.clone();

        let generation = {
            let mut inner = self.shared.lock()?;
            if inner.state.status != CallStatus::Idle {
                return Err(ConsultError::InvalidCallState {
                    expected: CallStatus::Idle.as_str(),
                    actual: inner.state.status.as_str(),
                });
            }
            inner.generation += 1;
            inner.timer = None;
            inner.pump = None;
            inner.state = CallState {
                status: CallStatus::Connecting,
                ..CallState::default()
            };
            inner.transcript.clear();
            inner.session = Some(session);
            self.shared.publish(&inner);
            inner.generation
        };

        tracing::info!(session_id = %session_id, "Voice call connecting");

        let events = match self.connect(assistant).await {
            Ok(events) => events,
            Err(reason) => {
                tracing::warn!(session_id = %session_id, reason = %reason, "Voice call failed to connect");
                if let Err(e) = self.shared.backend.stop().await {
                    tracing::debug!(error = %e, "Stop after failed connect also failed");
                }
                let mut inner = self.shared.lock()?;
                if inner.generation == generation {
                    inner.state = CallState::default();
                    self.shared.publish(&inner);
                }
                return Err(ConsultError::UpstreamServiceFailure(reason));
            }
        };

        let mut inner = self.shared.lock()?;
        if inner.generation != generation || inner.state.status != CallStatus::Connecting {
            return Err(ConsultError::InvalidCallState {
                expected: CallStatus::Connecting.as_str(),
                actual: inner.state.status.as_str(),
            });
        }
        inner.state.status = CallStatus::Connected;
        inner.state.elapsed_seconds = 0;

        // Cancel-before-start: the previous timer (if any) is gone before
        // the new one exists.
        inner.timer.take();
        let weak = Arc::downgrade(&self.shared);
        inner.timer = Some(CallTimer::start(CallTimer::PERIOD, move || {
            tick(&weak, generation)
        }));
        inner.pump = Some(tokio::spawn(pump(
            Arc::downgrade(&self.shared),
            generation,
            events,
        )));
        self.shared.publish(&inner);

        tracing::info!(session_id = %session_id, "Voice call connected");
        Ok(())
    }

    async fn connect(&self, assistant: AssistantConfig) -> Result<mpsc::Receiver<VoiceEvent>, String> {
        let mut events = self
            .shared
            .backend
            .start(assistant)
            .await
            .map_err(|e| e.to_string())?;

        let timeout = self.shared.call_config.connect_timeout;
        let started = tokio::time::timeout(timeout, async {
            loop {
                match events.recv().await {
                    Some(VoiceEvent::CallStarted) => return Ok(()),
                    Some(VoiceEvent::Error(message)) => return Err(message),
                    Some(VoiceEvent::CallEnded) | None => {
                        return Err("call ended before it started".to_string())
                    }
                    Some(other) => tracing::debug!(event = ?other, "Event before call start ignored"),
                }
            }
        })
        .await
        .map_err(|_| format!("no call-start within {}s", timeout.as_secs()))?;

        started.map(|()| events)
    }

    /// User-initiated end of call. Runs teardown and report generation and
    /// returns their outcome.
    pub async fn end_call(&self) -> Result<CallOutcome, ConsultError> {
        finish(&self.shared, EndReason::User).await
    }
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, CallInner>, ConsultError> {
        self.inner
            .lock()
            .map_err(|_| ConsultError::Storage("call state lock poisoned".into()))
    }

    fn publish(&self, inner: &CallInner) {
        self.snapshots.send_replace(inner.snapshot());
    }
}

fn tick(shared: &Weak<Shared>, generation: u64) -> bool {
    let Some(shared) = shared.upgrade() else {
        return false;
    };
    let Ok(mut inner) = shared.lock() else {
        return false;
    };
    if !inner.is_current(generation) {
        return false;
    }
    inner.state.elapsed_seconds += 1;
    shared.publish(&inner);
    true
}

async fn pump(shared: Weak<Shared>, generation: u64, mut events: mpsc::Receiver<VoiceEvent>) {
    loop {
        let event = events.recv().await;
        let Some(strong) = shared.upgrade() else {
            return;
        };

        let ended = {
            let Ok(mut inner) = strong.lock() else {
                return;
            };
            if !inner.is_current(generation) {
                return;
            }
            match event {
                Some(VoiceEvent::CallEnded) => true,
                None => {
                    tracing::warn!("Voice event stream closed without call-end");
                    true
                }
                Some(event) => {
                    apply_event(&mut inner, event);
                    strong.publish(&inner);
                    false
                }
            }
        };

        if ended {
            // `finish` aborts this task's handle, so run it elsewhere.
            tokio::spawn(async move {
                if let Err(e) = finish(&strong, EndReason::Remote).await {
                    tracing::debug!(error = %e, "Remote call end raced with local teardown");
                }
            });
            return;
        }
    }
}

fn apply_event(inner: &mut CallInner, event: VoiceEvent) {
    match event {
        VoiceEvent::Transcript {
            role,
            kind: TranscriptKind::Partial,
            text,
        } => {
            inner.state.live_role = Some(role);
            inner.state.live_partial_text = Some(text);
        }
        VoiceEvent::Transcript {
            role,
            kind: TranscriptKind::Final,
            text,
        } => {
            inner.transcript.push(TranscriptEntry::new(role, text));
            inner.state.clear_live();
        }
        VoiceEvent::SpeechStarted => inner.state.live_role = Some(TranscriptRole::Assistant),
        VoiceEvent::SpeechEnded => inner.state.live_role = Some(TranscriptRole::User),
        VoiceEvent::Error(message) => {
            tracing::warn!(error = %message, "Voice backend reported an error");
        }
        VoiceEvent::CallStarted | VoiceEvent::CallEnded => {}
    }
}

async fn finish(shared: &Arc<Shared>, reason: EndReason) -> Result<CallOutcome, ConsultError> {
    let (session, transcript) = {
        let mut inner = shared.lock()?;
        if inner.state.status != CallStatus::Connected {
            return Err(ConsultError::InvalidCallState {
                expected: CallStatus::Connected.as_str(),
                actual: inner.state.status.as_str(),
            });
        }
        inner.state.status = CallStatus::Disconnecting;
        inner.timer.take();
        if let Some(pump) = inner.pump.take() {
            pump.abort();
        }
        // An unfinalized utterance is dropped, never promoted.
        inner.state.clear_live();
        inner.state.elapsed_seconds = 0;
        shared.publish(&inner);

        let Some(session) = inner.session.clone() else {
            inner.state = CallState::default();
            shared.publish(&inner);
            return Err(ConsultError::InvalidCallState {
                expected: "call bound to a session",
                actual: "no session",
            });
        };
        (session, inner.transcript.clone())
    };

    tracing::info!(
        session_id = %session.session_id,
        reason = ?reason,
        transcript_entries = transcript.len(),
        "Voice call ending"
    );

    let teardown_error = match shared.backend.stop().await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(session_id = %session.session_id, error = %e, "Voice backend stop failed");
            Some(ConsultError::CallTeardownFailure(e.to_string()))
        }
    };

    let report = shared.reports.generate(&session, &transcript).await;
    if let Err(e) = &report {
        tracing::warn!(
            session_id = %session.session_id,
            code = e.code(),
            "Report generation after call failed"
        );
    }

    let outcome = CallOutcome {
        session_id: session.session_id.clone(),
        reason,
        transcript,
        report,
        teardown_error,
    };

    let mut inner = shared.lock()?;
    inner.state = CallState::default();
    inner.last_outcome = Some(outcome.clone());
    shared.publish(&inner);
    Ok(outcome)
}
