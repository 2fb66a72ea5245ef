//! Completion service boundary: one system instruction plus one user
//! message in, free text out. Sanitizing and parsing the text is the
//! caller's job.

pub mod http;
pub mod mock;

pub use http::*;
pub use mock::*;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Completion service is not reachable at {0}")]
    Connection(String),

    #[error("Completion service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Completion request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Completion response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Completion response contained no text")]
    EmptyResponse,
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Completion service client abstraction (allows mocking).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
