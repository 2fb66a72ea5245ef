//! Voice backend over a websocket bridge to the voice provider.
//!
//! Outbound: `{"type":"start","assistant":{..}}` then `{"type":"stop"}`.
//! Inbound: JSON frames named after the provider's lifecycle events.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::backend::{VoiceBackend, VoiceBackendError, EVENT_BUFFER};
use super::types::{AssistantConfig, TranscriptKind, VoiceEvent};
use crate::config::VoiceBackendConfig;
use crate::models::TranscriptRole;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

struct ActiveCall {
    sink: WsSink,
    reader: JoinHandle<()>,
}

pub struct WebSocketVoiceBackend {
    url: String,
    api_key: Option<String>,
    connect_timeout: Duration,
    active: Mutex<Option<ActiveCall>>,
}

impl WebSocketVoiceBackend {
    pub fn new(url: impl Into<String>, api_key: Option<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            api_key,
            connect_timeout,
            active: Mutex::new(None),
        }
    }

    /// Build from configuration; `None` when no bridge URL is set.
    pub fn from_config(config: &VoiceBackendConfig, connect_timeout: Duration) -> Option<Self> {
        config
            .url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.api_key.clone(), connect_timeout))
    }
}

#[async_trait]
impl VoiceBackend for WebSocketVoiceBackend {
    async fn start(
        &self,
        assistant: AssistantConfig,
    ) -> Result<mpsc::Receiver<VoiceEvent>, VoiceBackendError> {
        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            tracing::warn!("Voice bridge still had an open call; closing it");
            close_call(previous).await;
        }

        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| VoiceBackendError::Connection(e.to_string()))?;
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| VoiceBackendError::Connection(e.to_string()))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (stream, _) = tokio::time::timeout(self.connect_timeout, connect_async(request))
            .await
            .map_err(|_| VoiceBackendError::Connection("connect timed out".into()))?
            .map_err(|e| VoiceBackendError::Connection(e.to_string()))?;
        let (mut sink, mut source) = stream.split();

        let start_frame = json!({ "type": "start", "assistant": assistant });
        sink.send(Message::Text(start_frame.to_string()))
            .await
            .map_err(|e| VoiceBackendError::Protocol(e.to_string()))?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let reader = tokio::spawn(async move {
            while let Some(frame) = source.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if let Some(event) = parse_voice_event(&text) {
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Voice bridge read failed");
                        let _ = tx.send(VoiceEvent::Error(e.to_string())).await;
                        break;
                    }
                }
            }
            tracing::debug!("Voice bridge reader finished");
        });

        *active = Some(ActiveCall { sink, reader });
        tracing::info!("Voice bridge call opened");
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), VoiceBackendError> {
        let Some(mut call) = self.active.lock().await.take() else {
            return Ok(());
        };

        let sent = call
            .sink
            .send(Message::Text(json!({ "type": "stop" }).to_string()))
            .await
            .map_err(|e| VoiceBackendError::Protocol(e.to_string()));
        close_call(call).await;
        sent
    }
}

async fn close_call(mut call: ActiveCall) {
    if let Err(e) = call.sink.close().await {
        tracing::debug!(error = %e, "Voice bridge close failed");
    }
    call.reader.abort();
}

/// Translate one inbound frame. Unknown or irrelevant frames yield `None`.
///
/// Transcript messages are accepted both nested
/// (`{"type":"message","message":{"type":"transcript",..}}`) and flat
/// (`{"type":"message","transcriptType":..}` or `{"type":"transcript",..}`).
pub fn parse_voice_event(text: &str) -> Option<VoiceEvent> {
    let frame: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring non-JSON voice frame");
            return None;
        }
    };

    match frame.get("type").and_then(Value::as_str)? {
        "call-start" => Some(VoiceEvent::CallStarted),
        "call-end" => Some(VoiceEvent::CallEnded),
        "speech-start" => Some(VoiceEvent::SpeechStarted),
        "speech-end" => Some(VoiceEvent::SpeechEnded),
        "error" => Some(VoiceEvent::Error(
            frame
                .get("message")
                .or_else(|| frame.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("voice backend error")
                .to_string(),
        )),
        "message" => match frame.get("message") {
            Some(inner @ Value::Object(_)) => parse_transcript(inner),
            _ => parse_transcript(&frame),
        },
        "transcript" => parse_transcript(&frame),
        other => {
            tracing::debug!(frame_type = other, "Ignoring voice frame");
            None
        }
    }
}

fn parse_transcript(message: &Value) -> Option<VoiceEvent> {
    let kind_field = message.get("type").and_then(Value::as_str);
    if !matches!(kind_field, Some("transcript") | Some("message")) {
        return None;
    }

    let role = match message.get("role").and_then(Value::as_str)? {
        "user" => TranscriptRole::User,
        "assistant" => TranscriptRole::Assistant,
        _ => return None,
    };
    let kind = match message.get("transcriptType").and_then(Value::as_str)? {
        "partial" => TranscriptKind::Partial,
        "final" => TranscriptKind::Final,
        _ => return None,
    };
    let text = message.get("transcript").and_then(Value::as_str)?.to_string();

    Some(VoiceEvent::Transcript { role, kind, text })
}
