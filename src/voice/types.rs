use serde::Serialize;

use crate::config::VoiceCallConfig;
use crate::error::ConsultError;
use crate::models::enums::str_enum;
use crate::models::{MedicalReport, SpecialistProfile, TranscriptEntry, TranscriptRole};

str_enum!(
    /// Lifecycle of a voice call.
    CallStatus {
        Idle => "Idle",
        Connecting => "Connecting",
        Connected => "Connected",
        Disconnecting => "Disconnecting",
    }
);

/// Whether a transcript fragment is still being revised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptKind {
    Partial,
    Final,
}

/// Inbound event from the voice backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    CallStarted,
    CallEnded,
    /// The assistant began speaking.
    SpeechStarted,
    /// The assistant stopped speaking; the user is presumed to have the floor.
    SpeechEnded,
    Transcript {
        role: TranscriptRole,
        kind: TranscriptKind,
        text: String,
    },
    Error(String),
}

/// Ephemeral per-call state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallState {
    pub status: CallStatus,
    pub elapsed_seconds: u64,
    pub live_role: Option<TranscriptRole>,
    pub live_partial_text: Option<String>,
}

impl Default for CallState {
    fn default() -> Self {
        Self {
            status: CallStatus::Idle,
            elapsed_seconds: 0,
            live_role: None,
            live_partial_text: None,
        }
    }
}

impl CallState {
    pub fn clear_live(&mut self) {
        self.live_role = None;
        self.live_partial_text = None;
    }
}

/// What observers see of the current call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSnapshot {
    pub session_id: Option<String>,
    pub status: CallStatus,
    pub elapsed_seconds: u64,
    /// `elapsed_seconds` as MM:SS.
    pub elapsed: String,
    pub live_role: Option<TranscriptRole>,
    pub live_partial_text: Option<String>,
    pub transcript_len: usize,
}

impl Default for CallSnapshot {
    fn default() -> Self {
        Self {
            session_id: None,
            status: CallStatus::Idle,
            elapsed_seconds: 0,
            elapsed: format_elapsed(0),
            live_role: None,
            live_partial_text: None,
            transcript_len: 0,
        }
    }
}

/// Result of tearing a call down.
///
/// Report failure and teardown failure are reported separately; neither
/// prevents the controller from returning to `Idle`.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub session_id: String,
    pub reason: EndReason,
    pub transcript: Vec<TranscriptEntry>,
    pub report: Result<MedicalReport, ConsultError>,
    pub teardown_error: Option<ConsultError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The user ended the call.
    User,
    /// The backend reported the call as over, or its event stream closed.
    Remote,
}

/// Assistant setup handed to the voice backend when a call starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    pub name: String,
    pub first_message: String,
    pub transcriber: TranscriberSettings,
    pub voice: VoiceSettings,
    pub model: ModelSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriberSettings {
    pub provider: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSettings {
    pub provider: String,
    pub voice_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSettings {
    pub provider: String,
    pub model: String,
    pub messages: Vec<SystemMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMessage {
    pub role: String,
    pub content: String,
}

impl AssistantConfig {
    /// Persona prompt of `specialist` as the system instruction, plus the
    /// fixed opening line and provider choices.
    pub fn for_specialist(call: &VoiceCallConfig, specialist: &SpecialistProfile) -> Self {
        Self {
            name: call.assistant_name.clone(),
            first_message: call.first_message.clone(),
            transcriber: TranscriberSettings {
                provider: call.transcriber_provider.clone(),
                language: call.transcriber_language.clone(),
            },
            voice: VoiceSettings {
                provider: call.voice_provider.clone(),
                voice_id: specialist.voice_profile_id.clone(),
            },
            model: ModelSettings {
                provider: call.model_provider.clone(),
                model: call.model.clone(),
                messages: vec![SystemMessage {
                    role: "system".to_string(),
                    content: specialist.persona_prompt.clone(),
                }],
            },
        }
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.model.messages.first().map(|m| m.content.as_str())
    }
}

/// Seconds as zero-padded `MM:SS`. Minutes keep counting past 59.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specialists;

    #[test]
    fn call_status_names() {
        use std::str::FromStr;
        assert_eq!(CallStatus::Disconnecting.as_str(), "Disconnecting");
        assert_eq!(CallStatus::from_str("Connected").unwrap(), CallStatus::Connected);
        assert!(CallStatus::from_str("connected").is_err());
        assert_eq!(serde_json::to_value(CallStatus::Idle).unwrap(), "Idle");
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(7), "00:07");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3600), "60:00");
    }

    #[test]
    fn assistant_config_carries_persona() {
        let specialist = specialists::find(6).unwrap();
        let config = AssistantConfig::for_specialist(&VoiceCallConfig::default(), specialist);
        assert_eq!(config.system_prompt(), Some(specialist.persona_prompt.as_str()));
        assert_eq!(config.voice.voice_id, specialist.voice_profile_id);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["name"], "AI Medical Doctor Voice Agent");
        assert_eq!(json["transcriber"]["provider"], "assembly-ai");
        assert_eq!(json["model"]["messages"][0]["role"], "system");
        assert!(json["firstMessage"].as_str().unwrap().starts_with("Hello"));
        assert!(json["voice"]["voiceId"].is_string());
    }

    #[test]
    fn clear_live_resets_both_fields() {
        let mut state = CallState {
            live_role: Some(TranscriptRole::User),
            live_partial_text: Some("I also fee".into()),
            ..CallState::default()
        };
        state.clear_live();
        assert!(state.live_role.is_none());
        assert!(state.live_partial_text.is_none());
    }
}
