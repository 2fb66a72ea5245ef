//! Report generator: transcript plus session metadata in, validated
//! `MedicalReport` out, persisted through the session store.
//!
//! Nothing is written unless the model output parses and validates, so a
//! failed attempt leaves the stored session untouched and the call can be
//! repeated with the same transcript.

pub mod inflight;
pub mod parser;
pub mod prompt;
pub mod validation;

use std::sync::Arc;

use crate::error::ConsultError;
use crate::models::{ConsultationSession, MedicalReport, TranscriptEntry};
use crate::pipeline::completion::{CompletionClient, CompletionRequest};
use crate::pipeline::sanitize::{clean_model_output, truncate_for_log};
use crate::store::SessionStore;

use inflight::InFlightSessions;
use parser::parse_report;
use prompt::{build_report_user_prompt, REPORT_SYSTEM_PROMPT};
use validation::validate_report;

pub struct ReportGenerator {
    llm: Arc<dyn CompletionClient>,
    store: Arc<SessionStore>,
    in_flight: InFlightSessions,
}

impl ReportGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>, store: Arc<SessionStore>) -> Self {
        Self {
            llm,
            store,
            in_flight: InFlightSessions::new(),
        }
    }

    /// Whether a generation is currently running for the session.
    pub fn is_generating(&self, session_id: &str) -> bool {
        self.in_flight.is_in_flight(session_id)
    }

    /// Load the caller's session and generate its report.
    pub async fn generate_for(
        &self,
        owner: &str,
        session_id: &str,
        transcript: &[TranscriptEntry],
    ) -> Result<MedicalReport, ConsultError> {
        let session = self.store.get_session(owner, session_id)?;
        self.generate(&session, transcript).await
    }

    /// Generate, validate and persist a report for `session`.
    ///
    /// At most one generation runs per session; a concurrent request gets
    /// `ReportInProgress`. On success report and transcript are stored
    /// together, overwriting any earlier report.
    pub async fn generate(
        &self,
        session: &ConsultationSession,
        transcript: &[TranscriptEntry],
    ) -> Result<MedicalReport, ConsultError> {
        let session_id = session.session_id.as_str();
        let _claim = self
            .in_flight
            .try_claim(session_id)
            .ok_or_else(|| ConsultError::ReportInProgress(session_id.to_string()))?;

        tracing::info!(
            session_id = %session_id,
            transcript_entries = transcript.len(),
            model = %self.llm.model(),
            "Generating consultation report"
        );

        let request = CompletionRequest::new(
            REPORT_SYSTEM_PROMPT.trim(),
            build_report_user_prompt(session, transcript),
        );
        let raw = self.llm.complete(&request).await.map_err(|e| {
            tracing::warn!(session_id = %session_id, error = %e, "Report completion failed");
            ConsultError::UpstreamServiceFailure(e.to_string())
        })?;

        let cleaned = clean_model_output(&raw);
        let report = parse_report(&cleaned)
            .and_then(|raw_report| validate_report(&raw_report, session))
            .map_err(|reason| {
                tracing::warn!(
                    session_id = %session_id,
                    reason = %reason,
                    raw = %truncate_for_log(&cleaned),
                    "Report output rejected"
                );
                ConsultError::MalformedModelOutput {
                    raw: cleaned.clone(),
                }
            })?;

        self.store
            .update_report(&session.owner_identity, session_id, &report, transcript)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::pipeline::completion::{CompletionError, MockCompletionClient};
    use crate::specialists;

    const OWNER: &str = "ana@example.com";

    const COUGH_REPORT: &str = r#"```json
{
  "sessionId": "ignored",
  "agent": "General Physician AI",
  "user": "Ana",
  "timestamp": "2024-01-01T00:00:00Z",
  "chiefComplaint": "Persistent cough for three days.",
  "summary": "The patient reports a cough lasting 3 days. No fever was mentioned.",
  "symptoms": ["cough"],
  "duration": "3 days",
  "severity": "mild",
  "medicationsMentioned": [],
  "recommendations": ["Rest", "Stay hydrated", "See a doctor if it worsens"]
}
```"#;

    fn setup(mock: MockCompletionClient) -> (ReportGenerator, Arc<SessionStore>, ConsultationSession) {
        let store = Arc::new(SessionStore::in_memory().unwrap());
        let session = store
            .create_session(OWNER, "cough", Some(specialists::first()))
            .unwrap();
        let generator = ReportGenerator::new(Arc::new(mock), store.clone());
        (generator, store, session)
    }

    fn cough_transcript() -> Vec<TranscriptEntry> {
        vec![
            TranscriptEntry::user("I have a cough for 3 days"),
            TranscriptEntry::assistant("Noted"),
        ]
    }

    #[tokio::test]
    async fn cough_transcript_produces_report() {
        let (generator, store, session) = setup(MockCompletionClient::new(COUGH_REPORT));
        let transcript = cough_transcript();

        let report = generator.generate(&session, &transcript).await.unwrap();

        assert!(report.symptoms.iter().any(|s| s.to_lowercase().contains("cough")));
        assert!(report.duration_description.contains("3 days"));
        assert_eq!(report.severity, Severity::Mild);
        assert_eq!(report.session_id_ref, session.session_id);

        let stored = store.get_session(OWNER, &session.session_id).unwrap();
        assert_eq!(stored.report, Some(report));
        assert_eq!(stored.transcript, transcript);
    }

    #[tokio::test]
    async fn malformed_output_leaves_session_untouched() {
        let raw = "Sure! Here's the JSON: {not valid}";
        let (generator, store, session) = setup(MockCompletionClient::new(raw));

        let err = generator.generate(&session, &cough_transcript()).await.unwrap_err();
        match err {
            ConsultError::MalformedModelOutput { raw: got } => assert_eq!(got, raw),
            other => panic!("unexpected error: {other:?}"),
        }

        let stored = store.get_session(OWNER, &session.session_id).unwrap();
        assert!(stored.report.is_none());
        assert!(stored.transcript.is_empty());
    }

    #[tokio::test]
    async fn retry_after_malformed_keeps_only_second_result() {
        let mock = MockCompletionClient::new(COUGH_REPORT)
            .with_script(vec![Ok("{\"chiefComplaint\": \"half".into())]);
        let (generator, store, session) = setup(mock);
        let transcript = cough_transcript();

        assert!(matches!(
            generator.generate(&session, &transcript).await,
            Err(ConsultError::MalformedModelOutput { .. })
        ));
        assert!(store.get_session(OWNER, &session.session_id).unwrap().report.is_none());

        let second = generator.generate(&session, &transcript).await.unwrap();
        let stored = store.get_session(OWNER, &session.session_id).unwrap();
        assert_eq!(stored.report, Some(second));
    }

    #[tokio::test]
    async fn unknown_severity_rejected_before_persistence() {
        let body = r#"{"chiefComplaint":"c","summary":"s","severity":"Extreme"}"#;
        let (generator, store, session) = setup(MockCompletionClient::new(body));

        let err = generator.generate(&session, &cough_transcript()).await.unwrap_err();
        assert!(matches!(err, ConsultError::MalformedModelOutput { .. }));
        assert!(store.get_session(OWNER, &session.session_id).unwrap().report.is_none());
    }

    #[tokio::test]
    async fn negated_severity_is_not_escalated() {
        let body = r#"{"chiefComplaint":"c","summary":"s","severity":"Mild (not critical)"}"#;
        let (generator, store, session) = setup(MockCompletionClient::new(body));

        let err = generator.generate(&session, &cough_transcript()).await.unwrap_err();
        assert!(matches!(err, ConsultError::MalformedModelOutput { .. }));
        assert!(store.get_session(OWNER, &session.session_id).unwrap().report.is_none());
    }

    #[tokio::test]
    async fn severity_always_in_domain() {
        for (given, expected) in [
            ("Mild", Severity::Mild),
            ("moderate", Severity::Moderate),
            ("Severe ", Severity::Severe),
            ("critical", Severity::Critical),
            ("moderate to severe", Severity::Severe),
        ] {
            let body = format!(r#"{{"chiefComplaint":"c","summary":"s","severity":"{given}"}}"#);
            let (generator, _, session) = setup(MockCompletionClient::new(&body));
            let report = generator.generate(&session, &[]).await.unwrap();
            assert_eq!(report.severity, expected, "input {given}");
        }
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_without_write() {
        let (generator, store, session) =
            setup(MockCompletionClient::failing(CompletionError::Timeout(120)));
        let err = generator.generate(&session, &cough_transcript()).await.unwrap_err();
        assert!(matches!(err, ConsultError::UpstreamServiceFailure(_)));
        assert!(store.get_session(OWNER, &session.session_id).unwrap().report.is_none());
    }

    #[tokio::test]
    async fn concurrent_generation_for_same_session_refused() {
        let (generator, _, session) = setup(MockCompletionClient::new(COUGH_REPORT));
        let _held = generator.in_flight.try_claim(&session.session_id).unwrap();

        let err = generator.generate(&session, &cough_transcript()).await.unwrap_err();
        assert!(matches!(err, ConsultError::ReportInProgress(_)));
    }

    #[tokio::test]
    async fn claim_released_after_failure() {
        let mock = MockCompletionClient::new(COUGH_REPORT).with_script(vec![Ok("nope".into())]);
        let (generator, _, session) = setup(mock);

        assert!(generator.generate(&session, &[]).await.is_err());
        assert!(!generator.is_generating(&session.session_id));
        assert!(generator.generate(&session, &[]).await.is_ok());
    }

    #[tokio::test]
    async fn generate_for_is_owner_scoped() {
        let (generator, _, session) = setup(MockCompletionClient::new(COUGH_REPORT));
        let err = generator
            .generate_for("mallory@example.com", &session.session_id, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ConsultError::NotFound(_)));

        assert!(generator
            .generate_for(OWNER, &session.session_id, &cough_transcript())
            .await
            .is_ok());
    }
}
