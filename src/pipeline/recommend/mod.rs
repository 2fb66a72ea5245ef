//! Recommendation engine: free-text symptoms in, matching catalog
//! specialists out, via one completion-service call.
//!
//! The "first entry when nothing matches" default lives in the prompt only.
//! An empty array from the model is returned as-is.

pub mod parser;
pub mod prompt;

use std::sync::Arc;

use crate::error::{ConsultError, RecommendationFailure};
use crate::models::SpecialistProfile;
use crate::pipeline::completion::{CompletionClient, CompletionRequest};
use crate::pipeline::sanitize::{clean_model_output, truncate_for_log};
use crate::specialists;

use parser::parse_recommendations;
use prompt::{build_recommend_system_prompt, build_recommend_user_prompt};

pub struct SpecialistRecommender {
    llm: Arc<dyn CompletionClient>,
}

impl SpecialistRecommender {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Suggest specialists for the given notes. One attempt, no retry.
    pub async fn recommend(&self, notes: &str) -> Result<Vec<SpecialistProfile>, ConsultError> {
        let request = CompletionRequest::new(
            build_recommend_system_prompt(&specialists::catalog_json()),
            build_recommend_user_prompt(notes),
        );

        let raw = self.llm.complete(&request).await.map_err(|e| {
            tracing::warn!(model = %self.llm.model(), error = %e, "Recommendation request failed");
            ConsultError::RecommendationFailed(RecommendationFailure::Upstream(e.to_string()))
        })?;

        let cleaned = clean_model_output(&raw);
        match parse_recommendations(&cleaned) {
            Ok(matches) => {
                tracing::info!(matches = matches.len(), "Specialists recommended");
                Ok(matches)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e.0,
                    raw = %truncate_for_log(&cleaned),
                    "Recommendation output could not be parsed"
                );
                Err(ConsultError::RecommendationFailed(
                    RecommendationFailure::MalformedOutput { raw: cleaned },
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::completion::{CompletionError, MockCompletionClient};

    fn recommender(mock: MockCompletionClient) -> (SpecialistRecommender, Arc<MockCompletionClient>) {
        let mock = Arc::new(mock);
        (SpecialistRecommender::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn headache_notes_yield_non_empty_list() {
        let (rec, mock) = recommender(MockCompletionClient::new(
            "```json\n[{\"id\": 1, \"name\": \"General Physician\"}]\n```",
        ));

        let out = rec
            .recommend("I have had a sharp headache and blurred vision for 2 days")
            .await
            .unwrap();

        assert!(!out.is_empty());
        assert_eq!(out[0].id, 1);
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user.starts_with("User notes/symptoms: I have had a sharp headache"));
        assert!(requests[0].system.contains("General Physician"));
    }

    #[tokio::test]
    async fn answer_tags_are_stripped() {
        let (rec, _) = recommender(MockCompletionClient::new(
            "<answer>[{\"id\": 6}, {\"id\": 1}]</answer>",
        ));
        let ids: Vec<u32> = rec.recommend("chest pain").await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![6, 1]);
    }

    #[tokio::test]
    async fn any_wrapper_tag_is_stripped() {
        for reply in [
            "<json>[{\"id\": 1}]</json>",
            "<output>[{\"id\": 1}]</output>",
            "<result>\n[{\"id\": 1}]\n</result>",
        ] {
            let (rec, _) = recommender(MockCompletionClient::new(reply));
            let ids: Vec<u32> = rec.recommend("cough").await.unwrap().iter().map(|p| p.id).collect();
            assert_eq!(ids, vec![1], "reply: {reply}");
        }
    }

    #[tokio::test]
    async fn empty_array_is_not_replaced() {
        let (rec, _) = recommender(MockCompletionClient::new("[]"));
        assert!(rec.recommend("asdf qwerty").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_notes_do_not_crash() {
        let (rec, _) = recommender(MockCompletionClient::new("[{\"id\": 1}]"));
        assert_eq!(rec.recommend("").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_output_carries_raw_text() {
        let (rec, _) = recommender(MockCompletionClient::new("I think you should see a doctor."));
        let err = rec.recommend("tired").await.unwrap_err();
        match err {
            ConsultError::RecommendationFailed(RecommendationFailure::MalformedOutput { raw }) => {
                assert_eq!(raw, "I think you should see a doctor.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_single_attempt() {
        let (rec, mock) = recommender(MockCompletionClient::failing(CompletionError::Status {
            status: 503,
            body: "overloaded".into(),
        }));
        let err = rec.recommend("rash").await.unwrap_err();
        assert!(matches!(
            err,
            ConsultError::RecommendationFailed(RecommendationFailure::Upstream(_))
        ));
        assert_eq!(mock.call_count(), 1);
    }
}
