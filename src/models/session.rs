use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::TranscriptRole;
use super::report::MedicalReport;
use super::specialist::SpecialistProfile;

/// One finalized utterance in a consultation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: TranscriptRole,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(role: TranscriptRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TranscriptRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(TranscriptRole::Assistant, text)
    }
}

/// A persisted consultation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationSession {
    pub session_id: String,
    pub owner_identity: String,
    pub intake_notes: String,
    /// Snapshot taken at creation; later catalog edits do not reach it.
    pub selected_specialist: SpecialistProfile,
    pub transcript: Vec<TranscriptEntry>,
    pub report: Option<MedicalReport>,
    pub created_on: DateTime<Utc>,
}
