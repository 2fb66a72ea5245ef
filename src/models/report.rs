use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::Severity;

/// Patient label used when the conversation never names the patient.
pub const ANONYMOUS_PATIENT: &str = "Anonymous Patient";

/// Duration sentinel used when the patient never states how long symptoms lasted.
pub const DURATION_NOT_SPECIFIED: &str = "Not specified";

/// Structured post-consultation report.
///
/// Field names on the wire follow the report viewer's JSON shape
/// (`agent`, `user`, `timestamp`, `duration`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalReport {
    #[serde(rename = "sessionId")]
    pub session_id_ref: String,
    #[serde(rename = "agent")]
    pub agent_label: String,
    #[serde(rename = "user")]
    pub patient_label: String,
    #[serde(rename = "timestamp")]
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "chiefComplaint")]
    pub chief_complaint: String,
    pub summary: String,
    pub symptoms: Vec<String>,
    #[serde(rename = "duration")]
    pub duration_description: String,
    pub severity: Severity,
    #[serde(rename = "medicationsMentioned")]
    pub medications_mentioned: Vec<String>,
    pub recommendations: Vec<String>,
}
