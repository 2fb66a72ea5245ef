//! Shared types for the API layer.

use std::sync::Arc;

use serde::Serialize;

use crate::core_state::CoreState;
use crate::models::{MedicalReport, TranscriptEntry};
use crate::voice::{CallOutcome, EndReason};

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Error entry inside a successful response body.
#[derive(Debug, Serialize)]
pub struct ErrorSummary {
    pub code: &'static str,
    pub message: String,
}

/// Wire form of a finished call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallOutcomeView {
    pub session_id: String,
    pub ended_by: &'static str,
    pub transcript: Vec<TranscriptEntry>,
    pub report: Option<MedicalReport>,
    pub report_error: Option<ErrorSummary>,
    pub teardown_error: Option<ErrorSummary>,
}

impl From<CallOutcome> for CallOutcomeView {
    fn from(outcome: CallOutcome) -> Self {
        let summary = |e: crate::error::ConsultError| ErrorSummary {
            code: e.code(),
            message: e.to_string(),
        };
        let (report, report_error) = match outcome.report {
            Ok(report) => (Some(report), None),
            Err(e) => (None, Some(summary(e))),
        };
        Self {
            session_id: outcome.session_id,
            ended_by: match outcome.reason {
                EndReason::User => "user",
                EndReason::Remote => "remote",
            },
            transcript: outcome.transcript,
            report,
            report_error,
            teardown_error: outcome.teardown_error.map(summary),
        }
    }
}
