//! Google Gemini `generateContent` client.
//!
//! Blocking reqwest client: the whole run happens on the UI thread, so no
//! async runtime is involved.

use serde::{Deserialize, Serialize};

use super::{AiError, TextModel};
use crate::config::Config;

/// Gemini API client (blocking).
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, AiError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("guideline-checker/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl TextModel for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let url = self.endpoint();
        log::debug!("POST {url} ({} prompt chars)", prompt.len());

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json()?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }

        log::debug!("Gemini replied with {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;

    use super::*;

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(&Config {
            api_key: "test-key".into(),
            model: "gemini-1.5-flash".into(),
            base_url: server.base_url(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_generate_concatenates_parts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/models/gemini-1.5-flash:generateContent")
                .header("x-goog-api-key", "test-key")
                .json_body(serde_json::json!({
                    "contents": [{ "parts": [{ "text": "hello" }] }]
                }));
            then.status(200).json_body(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "[{\"a\":" }, { "text": "1}]" }] },
                    "finishReason": "STOP"
                }]
            }));
        });

        let text = client(&server).generate("hello").unwrap();
        mock.assert();
        assert_eq!(text, "[{\"a\":1}]");
    }

    #[test]
    fn test_http_error_carries_status_and_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(403).body("API key not valid");
        });

        let err = client(&server).generate("hello").unwrap_err();
        match err {
            AiError::Http { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .json_body(serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
        });

        let err = client(&server).generate("hello").unwrap_err();
        assert!(matches!(err, AiError::EmptyResponse));
    }
}
