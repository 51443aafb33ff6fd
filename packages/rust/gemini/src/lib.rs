//! Gemini `generateContent` client implementing [`TextGenerator`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use salesintel_shared::{GenerationRequest, Result, SalesIntelError, TextGenerator};

const USER_AGENT: &str = concat!("salesintel/", env!("CARGO_PKG_VERSION"));

/// HTTP client for one Gemini model.
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client for `model` against the API at `base_url`.
    pub fn new(api_key: &str, model: &str, base_url: &str, timeout_secs: u64) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| {
            SalesIntelError::config(format!("invalid Gemini base URL '{base_url}': {e}"))
        })?;
        let endpoint = endpoint_for(&base, model)?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SalesIntelError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// `{base}/v1beta/models/{model}:generateContent`
fn endpoint_for(base: &Url, model: &str) -> Result<Url> {
    if model.trim().is_empty() {
        return Err(SalesIntelError::config(
            "Gemini model name must not be empty",
        ));
    }
    let method = format!("{model}:generateContent");
    let mut endpoint = base.clone();
    endpoint
        .path_segments_mut()
        .map_err(|_| SalesIntelError::config(format!("invalid Gemini base URL '{base}'")))?
        .pop_if_empty()
        .extend(["v1beta", "models", method.as_str()]);
    Ok(endpoint)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: request.json_response.then_some("application/json"),
            },
        }
    }
}

/// Concatenated text parts of the first candidate.
fn reply_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| SalesIntelError::generation("response contained no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(SalesIntelError::generation(format!(
            "empty reply (finish reason: {reason})"
        )));
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model, json = request.json_response))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(prompt_chars = request.prompt.len(), "sending generateContent");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentBody::from_request(request))
            .send()
            .await
            .map_err(|e| SalesIntelError::generation(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SalesIntelError::generation(format!("body read failed: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| env.error.message)
                .unwrap_or(body);
            warn!(%status, "generateContent rejected");
            return Err(SalesIntelError::generation(format!(
                "HTTP {status}: {detail}"
            )));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            SalesIntelError::generation(format!("malformed generateContent response: {e}"))
        })?;
        let text = reply_text(parsed)?;
        debug!(reply_chars = text.len(), "generateContent ok");
        Ok(text)
    }
}
