use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::types::{AssistantConfig, VoiceEvent};

/// Buffered events per call before the backend applies backpressure.
pub const EVENT_BUFFER: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceBackendError {
    #[error("Voice backend not configured")]
    NotConfigured,

    #[error("Voice backend connection failed: {0}")]
    Connection(String),

    #[error("Voice backend protocol error: {0}")]
    Protocol(String),

    #[error("Voice backend rejected the request: {0}")]
    Rejected(String),
}

/// Real-time voice session provider.
///
/// `start` opens a session and returns its single inbound event stream.
/// `stop` ends the current session; calling it with no active session is
/// not an error.
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    async fn start(
        &self,
        assistant: AssistantConfig,
    ) -> Result<mpsc::Receiver<VoiceEvent>, VoiceBackendError>;

    async fn stop(&self) -> Result<(), VoiceBackendError>;
}

/// Backend used when no voice bridge is configured. Every start fails.
pub struct UnconfiguredVoiceBackend;

#[async_trait]
impl VoiceBackend for UnconfiguredVoiceBackend {
    async fn start(
        &self,
        _assistant: AssistantConfig,
    ) -> Result<mpsc::Receiver<VoiceEvent>, VoiceBackendError> {
        Err(VoiceBackendError::NotConfigured)
    }

    async fn stop(&self) -> Result<(), VoiceBackendError> {
        Ok(())
    }
}

/// Test double driven from the test body.
///
/// By default `start` immediately queues `CallStarted`. Tests push further
/// events with `emit`.
pub struct MockVoiceBackend {
    auto_connect: bool,
    start_error: Option<VoiceBackendError>,
    stop_error: Option<VoiceBackendError>,
    sender: Mutex<Option<mpsc::Sender<VoiceEvent>>>,
    last_assistant: Mutex<Option<AssistantConfig>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl Default for MockVoiceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVoiceBackend {
    pub fn new() -> Self {
        Self {
            auto_connect: true,
            start_error: None,
            stop_error: None,
            sender: Mutex::new(None),
            last_assistant: Mutex::new(None),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// Never sends `CallStarted` on its own.
    pub fn silent() -> Self {
        Self {
            auto_connect: false,
            ..Self::new()
        }
    }

    pub fn failing_start(error: VoiceBackendError) -> Self {
        Self {
            start_error: Some(error),
            ..Self::new()
        }
    }

    pub fn with_stop_error(mut self, error: VoiceBackendError) -> Self {
        self.stop_error = Some(error);
        self
    }

    /// Deliver an event on the current call's stream. Returns `false` if no
    /// call is open or the receiver is gone.
    pub async fn emit(&self, event: VoiceEvent) -> bool {
        let sender = self.sender.lock().ok().and_then(|s| s.clone());
        match sender {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Close the event stream without a `CallEnded` event.
    pub fn hang_up(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn last_assistant(&self) -> Option<AssistantConfig> {
        self.last_assistant.lock().ok().and_then(|a| a.clone())
    }
}

#[async_trait]
impl VoiceBackend for MockVoiceBackend {
    async fn start(
        &self,
        assistant: AssistantConfig,
    ) -> Result<mpsc::Receiver<VoiceEvent>, VoiceBackendError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.start_error {
            return Err(err.clone());
        }
        if let Ok(mut last) = self.last_assistant.lock() {
            *last = Some(assistant);
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        if self.auto_connect {
            tx.send(VoiceEvent::CallStarted)
                .await
                .map_err(|e| VoiceBackendError::Protocol(e.to_string()))?;
        }
        if let Ok(mut sender) = self.sender.lock() {
            *sender = Some(tx);
        }
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), VoiceBackendError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.hang_up();
        match &self.stop_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
