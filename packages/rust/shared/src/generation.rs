//! The text generation capability consumed by the analysis and outreach stages.

use async_trait::async_trait;

use crate::error::Result;

/// One generation call: prompt plus sampling limits.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask the backend for a JSON object instead of free prose.
    pub json_response: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_output_tokens,
            json_response: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Remote (or canned) text generator.
///
/// Failures are reported as [`SalesIntelError::Generation`](crate::SalesIntelError::Generation)
/// or [`SalesIntelError::Network`](crate::SalesIntelError::Network).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model or backend name, for logs.
    fn model(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
