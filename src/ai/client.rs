use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::config::AiConfig;

/// Anything that can turn a prompt into generated text.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, TransformError>;
}

/// Client for the `generateContent` REST endpoint.
pub struct GeminiClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig, api_key: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(concat!("focusx/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn response_text(response: GenerateResponse) -> Result<String, TransformError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(TransformError::Malformed)
    } else {
        Ok(text)
    }
}

// ureq's own Display includes the request URL, which carries the key.
fn describe(err: &ureq::Error) -> String {
    match err {
        ureq::Error::Status(code, _) => format!("HTTP status {}", code),
        ureq::Error::Transport(transport) => transport.kind().to_string(),
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, TransformError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .agent
            .post(&self.url())
            .query("key", &self.api_key)
            .send_json(&body)
            .map_err(|err| {
                let detail = describe(&err);
                log::error!("generateContent request failed: {}", detail);
                TransformError::Request(detail)
            })?;

        let parsed: GenerateResponse = response.into_json().map_err(|err| {
            log::error!("generateContent returned unreadable body: {}", err);
            TransformError::Malformed
        })?;
        response_text(parsed)
    }
}
