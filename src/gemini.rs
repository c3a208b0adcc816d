// Client for the Gemini `generateContent` API.

use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::config::GeminiConfig;
use crate::error::QuizError;

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 4096,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
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
struct GenerateContentResponse {
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

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present.
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Shared handle to the generation API. Cheap to use concurrently.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        GeminiClient {
            http: reqwest::Client::new(),
            config,
            generation: GenerationConfig::default(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send one prompt and return the first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, QuizError> {
        if self.config.api_key.trim().is_empty() {
            return Err(QuizError::NotConfigured);
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation,
        };

        tracing::info!("Calling Gemini model {}", self.config.model);
        timeout(self.config.timeout, self.exchange(&body))
            .await
            .map_err(|_| {
                tracing::warn!("Gemini request timed out after {:?}", self.config.timeout);
                QuizError::Timeout
            })?
    }

    async fn exchange(&self, body: &GenerateContentRequest<'_>) -> Result<String, QuizError> {
        let response = self
            .http
            .post(self.config.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response body>".to_string());
            tracing::error!("Gemini API error: {status}, {detail}");
            return Err(QuizError::UpstreamStatus(status.as_u16()));
        }

        let reply: GenerateContentResponse = response.json().await.map_err(network_error)?;
        reply.first_text().ok_or_else(|| {
            tracing::warn!("Gemini reply carried no candidate text");
            QuizError::EmptyReply
        })
    }
}

/// Map a transport error. The request URL carries the API key, so it is
/// stripped before the error reaches logs or clients.
fn network_error(e: reqwest::Error) -> QuizError {
    if e.is_timeout() {
        QuizError::Timeout
    } else {
        QuizError::Network(e.without_url().to_string())
    }
}
