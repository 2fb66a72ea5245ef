//! Consultation error taxonomy shared by the store, pipelines and the
//! voice controller.

use thiserror::Error;

use crate::db::DatabaseError;

/// Why a recommendation could not be produced. Both kinds surface as
/// `ConsultError::RecommendationFailed`; the split is for diagnosis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendationFailure {
    /// Completion service unreachable or erroring. Caller may retry.
    #[error("completion service failure: {0}")]
    Upstream(String),
    /// Response received but not a JSON array of specialists.
    #[error("malformed completion output")]
    MalformedOutput { raw: String },
}

#[derive(Error, Debug, Clone)]
pub enum ConsultError {
    #[error("Caller identity could not be resolved")]
    Unauthenticated,

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream service failure: {0}")]
    UpstreamServiceFailure(String),

    #[error("Model output could not be parsed into the expected shape")]
    MalformedModelOutput { raw: String },

    #[error("Call teardown failed: {0}")]
    CallTeardownFailure(String),

    #[error("Recommendation failed: {0}")]
    RecommendationFailed(RecommendationFailure),

    #[error("Report generation already in progress for session {0}")]
    ReportInProgress(String),

    #[error("Invalid call state: expected {expected}, was {actual}")]
    InvalidCallState {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConsultError {
    /// Stable machine-readable code, used by the HTTP layer and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UpstreamServiceFailure(_) => "UPSTREAM_FAILURE",
            Self::MalformedModelOutput { .. } => "MALFORMED_MODEL_OUTPUT",
            Self::CallTeardownFailure(_) => "CALL_TEARDOWN_FAILURE",
            Self::RecommendationFailed(_) => "RECOMMENDATION_FAILED",
            Self::ReportInProgress(_) => "REPORT_IN_PROGRESS",
            Self::InvalidCallState { .. } => "INVALID_CALL_STATE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Raw model text attached to output-shape failures, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::MalformedModelOutput { raw } => Some(raw),
            Self::RecommendationFailed(RecommendationFailure::MalformedOutput { raw }) => Some(raw),
            _ => None,
        }
    }
}

impl From<DatabaseError> for ConsultError {
    fn from(err: DatabaseError) -> Self {
        ConsultError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_output_exposed_for_malformed_kinds() {
        let err = ConsultError::MalformedModelOutput { raw: "{oops".into() };
        assert_eq!(err.raw_output(), Some("{oops"));

        let err = ConsultError::RecommendationFailed(RecommendationFailure::MalformedOutput {
            raw: "nope".into(),
        });
        assert_eq!(err.raw_output(), Some("nope"));
        assert_eq!(err.code(), "RECOMMENDATION_FAILED");

        let err = ConsultError::RecommendationFailed(RecommendationFailure::Upstream("503".into()));
        assert!(err.raw_output().is_none());
        assert_eq!(err.code(), "RECOMMENDATION_FAILED");
    }

    #[test]
    fn recommendation_failure_messages() {
        let upstream = RecommendationFailure::Upstream("503".into());
        assert_eq!(upstream.to_string(), "completion service failure: 503");
        let malformed = RecommendationFailure::MalformedOutput { raw: "secret".into() };
        assert_eq!(malformed.to_string(), "malformed completion output");
    }

    #[test]
    fn database_errors_map_to_storage() {
        let err: ConsultError = DatabaseError::ConstraintViolation("bad".into()).into();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
