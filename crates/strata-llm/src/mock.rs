//! Mock LLM provider for testing
//!
//! Replies are scripted in order; an exhausted queue answers with a default
//! text. Every request is recorded so tests can assert on the prompts sent.

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

enum Scripted {
    Reply(String),
    Fail(String),
}

/// A mock LLM provider that returns queued responses.
#[derive(Clone)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a text reply.
    pub fn add_response(&self, content: impl Into<String>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Scripted::Reply(content.into()));
    }

    /// Queue a failed call.
    pub fn add_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Scripted::Fail(message.into()));
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copies of every request received, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(Scripted::Reply(content)) => Ok(CompletionResponse::text("mock-model", content)),
            Some(Scripted::Fail(message)) => Err(Error::Api(message)),
            None => Ok(CompletionResponse::text("mock-model", "mock response")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[tokio::test]
    async fn test_scripted_order() {
        let mock = MockProvider::new();
        mock.add_response("first");
        mock.add_failure("boom");

        let req = CompletionRequest::new("").with_message(Message::user("q"));
        assert_eq!(mock.complete(req.clone()).await.unwrap().content, "first");
        assert!(mock.complete(req.clone()).await.is_err());
        assert_eq!(mock.complete(req).await.unwrap().content, "mock response");
        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.requests()[0].messages[0].content, "q");
    }
}
