//! Gemini completion client
//!
//! Thin async wrapper over the `generateContent` REST endpoint. One request
//! in, one trimmed text out; every provider-side failure is normalized into
//! `AppError` so the session controller only ever sees one error surface.

use std::sync::OnceLock;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::shared::error::{AppError, AppResult};

pub const GEMINI_TEXT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Environment variable holding the Gemini API credential.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// Lazy static HTTP client to reuse connection pool
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

fn http_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// The single seam to the AI service. The session controller depends on
/// this trait, never on `GeminiClient` directly, so tests can substitute
/// a scripted provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

// -- Strict Serde Structs for the generateContent wire format --

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Pull the textual payload out of a response, or fail if the shape is off.
fn extract_text(response: GenerateContentResponse) -> AppResult<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::MalformedResponse(
            "The response did not contain a text payload".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
}

static GEMINI_CLIENT: OnceCell<GeminiClient> = OnceCell::new();

impl GeminiClient {
    /// Read the credential from the environment. Fails with a distinguished
    /// configuration error so callers can show a remediation message.
    pub fn from_env() -> AppResult<Self> {
        let api_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "{} environment variable is not set",
                    API_KEY_ENV_VAR
                ))
            })?;
        Ok(Self { api_key })
    }

    /// Process-wide client, constructed at most once on first use.
    pub fn shared() -> AppResult<&'static GeminiClient> {
        GEMINI_CLIENT.get_or_try_init(GeminiClient::from_env)
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, GEMINI_TEXT_MODEL, self.api_key
        );

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = http_client()
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                eprintln!("Gemini API Network Error: {}", e);
                AppError::Provider(format!("Gemini API connection failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            // The error body carries the useful message ("API key not valid",
            // quota exceeded, ...); fall back to the bare status if absent.
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| format!("Gemini API returned error: {}", status));
            eprintln!("Gemini API Error: {}", message);
            return Err(AppError::Provider(message));
        }

        let parsed = response.json::<GenerateContentResponse>().await.map_err(|e| {
            eprintln!("Gemini API Parse Error: {}", e);
            AppError::MalformedResponse(format!("Failed to parse Gemini response: {}", e))
        })?;

        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).expect("valid response json")
    }

    #[test]
    fn test_extract_text_trims_whitespace() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"  hello world \n"}]}}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "hello world");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"first "},{"text":"second"}]}}]}"#,
        );
        assert_eq!(extract_text(response).unwrap(), "first second");
    }

    #[test]
    fn test_missing_candidates_is_malformed() {
        let response = parse(r#"{}"#);
        assert!(matches!(
            extract_text(response),
            Err(AppError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_empty_text_is_malformed() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"   "}]}}]}"#,
        );
        assert!(matches!(
            extract_text(response),
            Err(AppError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_candidate_without_content_is_malformed() {
        let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(
            extract_text(response),
            Err(AppError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_from_env_requires_credential() {
        // Exercise both branches in one test; env vars are process-global.
        std::env::remove_var(API_KEY_ENV_VAR);
        let err = GeminiClient::from_env().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_ENV_VAR));

        std::env::set_var(API_KEY_ENV_VAR, "test-key");
        assert!(GeminiClient::from_env().is_ok());
        std::env::remove_var(API_KEY_ENV_VAR);
    }
}
