use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionClient, CompletionError, CompletionRequest};

/// Scripted completion client for tests.
///
/// Replies are consumed in order; once the script runs out the fallback
/// reply is repeated. Every request is recorded.
pub struct MockCompletionClient {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    fallback: Result<String, CompletionError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionClient {
    /// Always answer with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Ok(response.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: CompletionError) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with each scripted reply once, then fall back.
    pub fn with_script(mut self, replies: Vec<Result<String, CompletionError>>) -> Self {
        self.script = Mutex::new(replies.into());
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_response() {
        let client = MockCompletionClient::new("test response");
        let out = client
            .complete(&CompletionRequest::new("system", "prompt"))
            .await
            .unwrap();
        assert_eq!(out, "test response");
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.requests()[0].system, "system");
    }

    #[tokio::test]
    async fn script_then_fallback() {
        let client = MockCompletionClient::new("fallback").with_script(vec![
            Err(CompletionError::EmptyResponse),
            Ok("second".into()),
        ]);
        let req = CompletionRequest::new("s", "u");
        assert_eq!(client.complete(&req).await, Err(CompletionError::EmptyResponse));
        assert_eq!(client.complete(&req).await.unwrap(), "second");
        assert_eq!(client.complete(&req).await.unwrap(), "fallback");
    }
}
