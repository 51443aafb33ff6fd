//! Test doubles shared by the stage tests.

use std::sync::Mutex;

use async_trait::async_trait;
use salesintel_shared::{GenerationRequest, Result, SalesIntelError, TextGenerator};

/// Generator with a fixed reply that records every request.
pub struct StubGenerator {
    reply: String,
    /// Fail any prompt containing this text (every prompt when empty).
    fail_on: Option<String>,
    error: String,
    pub seen: Mutex<Vec<GenerationRequest>>,
}

impl StubGenerator {
    pub fn ok(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_on: None,
            error: String::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            reply: String::new(),
            fail_on: Some(String::new()),
            error: error.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `reply`, except for prompts mentioning `needle`.
    pub fn failing_for(needle: &str, reply: &str, error: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_on: Some(needle.to_string()),
            error: error.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    fn model(&self) -> &str {
        "stub"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.seen.lock().unwrap().push(request.clone());
        match &self.fail_on {
            Some(needle) if request.prompt.contains(needle.as_str()) => {
                Err(SalesIntelError::generation(self.error.clone()))
            }
            _ => Ok(self.reply.clone()),
        }
    }
}
