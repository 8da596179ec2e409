//! The enrichment adapter: an explicitly constructed vision-model client.
//!
//! [`VisionOptions`] carries everything the remote endpoint needs — URL,
//! bearer credential, model, output-token budget, prompt, timeout. The
//! credential comes from the environment exactly once, in
//! [`VisionOptions::from_env`], which fails fast *before* any document work
//! so a misconfigured run never produces partial output.
//!
//! [`VisionClient`] wraps a [`reqwest::Client`] configured with the request
//! timeout and speaks the OpenAI-compatible chat-completions vision format:
//! one user message with a text part and a base64 `data:` image part. The
//! client has no global state and lives exactly as long as the processing
//! run that constructed it.
//!
//! ## Retry strategy
//!
//! HTTP 429 / 5xx and transport errors are transient and frequent under
//! concurrent load; they retry with exponential backoff
//! (`backoff_ms × 2^attempt`). Permanent errors (401, 400) surface
//! immediately — retrying a bad credential only wastes the backoff budget.

use crate::config::Detail;
use crate::error::DocmarkError;
use crate::prompts::DEFAULT_DESCRIBE_PROMPT;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Environment variable holding the API credential.
pub const CREDENTIAL_VAR: &str = "OPENAI_API_KEY";

/// Default chat-completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Configuration for the remote vision endpoint.
#[derive(Clone)]
pub struct VisionOptions {
    /// Chat-completions URL.
    pub endpoint: String,
    /// Bearer credential sent in the `Authorization` header.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Maximum output tokens per call.
    pub max_tokens: usize,
    /// Prompt used for picture descriptions.
    pub prompt: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl VisionOptions {
    /// Build options with the given credential and defaults for the rest.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 300,
            prompt: DEFAULT_DESCRIBE_PROMPT.to_string(),
            timeout_secs: 60,
        }
    }

    /// Read the credential from [`CREDENTIAL_VAR`], failing fast when absent.
    ///
    /// Call this before opening any document: a missing credential is a
    /// configuration error, not a mid-run surprise.
    pub fn from_env() -> Result<Self, DocmarkError> {
        match std::env::var(CREDENTIAL_VAR) {
            Ok(key) if !key.is_empty() => Ok(Self::new(key)),
            _ => Err(DocmarkError::MissingCredential {
                var: CREDENTIAL_VAR,
            }),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for VisionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionOptions")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// One successful chat-completions round trip.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Assistant message content.
    pub content: String,
    /// Provider-assigned response identifier.
    pub response_id: String,
    /// Total tokens the provider reported for the call.
    pub total_tokens: u64,
}

/// A vision-model client scoped to one processing run.
#[derive(Debug, Clone)]
pub struct VisionClient {
    http: reqwest::Client,
    options: VisionOptions,
}

impl VisionClient {
    /// Construct a client from options, building the HTTP client with the
    /// configured timeout.
    pub fn new(options: VisionOptions) -> Result<Self, DocmarkError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| DocmarkError::RequestFailed {
                detail: e.to_string(),
            })?;
        Ok(Self { http, options })
    }

    /// The options this client was built from.
    pub fn options(&self) -> &VisionOptions {
        &self.options
    }

    /// Describe one picture (PNG bytes), retrying transient failures.
    pub async fn describe_picture(
        &self,
        png: &[u8],
        max_retries: u32,
        backoff_ms: u64,
    ) -> Result<String, DocmarkError> {
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png));
        let outcome = self
            .chat_with_retries(
                &self.options.prompt,
                &data_url,
                None,
                self.options.max_tokens,
                max_retries,
                backoff_ms,
            )
            .await?;
        Ok(outcome.content)
    }

    /// Transcribe one page image (already base64-encoded PNG), retrying
    /// transient failures.
    pub async fn transcribe_page(
        &self,
        png_base64: &str,
        detail: Detail,
        prompt: &str,
        max_tokens: usize,
        max_retries: u32,
        backoff_ms: u64,
    ) -> Result<ChatOutcome, DocmarkError> {
        let data_url = format!("data:image/png;base64,{png_base64}");
        self.chat_with_retries(
            prompt,
            &data_url,
            Some(detail.as_str()),
            max_tokens,
            max_retries,
            backoff_ms,
        )
        .await
    }

    async fn chat_with_retries(
        &self,
        prompt: &str,
        data_url: &str,
        detail: Option<&str>,
        max_tokens: usize,
        max_retries: u32,
        backoff_ms: u64,
    ) -> Result<ChatOutcome, DocmarkError> {
        let mut last_err: Option<DocmarkError> = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let backoff = backoff_ms * 2u64.pow(attempt - 1);
                warn!("vision call retry {attempt}/{max_retries} after {backoff}ms");
                sleep(Duration::from_millis(backoff)).await;
            }

            match self.chat(prompt, data_url, detail, max_tokens).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if is_retryable(&e) => {
                    warn!("vision call attempt {} failed: {e}", attempt + 1);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err
            .unwrap_or_else(|| DocmarkError::Internal("retry loop exited without error".into())))
    }

    async fn chat(
        &self,
        prompt: &str,
        data_url: &str,
        detail: Option<&str>,
        max_tokens: usize,
    ) -> Result<ChatOutcome, DocmarkError> {
        let request = ChatRequest {
            model: &self.options.model,
            temperature: 0.0,
            max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: data_url,
                            detail,
                        },
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(&self.options.endpoint)
            .bearer_auth(&self.options.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocmarkError::RequestFailed {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocmarkError::ApiError {
                status: status.as_u16(),
                detail: truncate(&body, 300),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| DocmarkError::EmptyResponse {
                    detail: format!("malformed response body: {e}"),
                })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DocmarkError::EmptyResponse {
                detail: "response contained no choices".into(),
            })?;

        let total_tokens = parsed.usage.map(|u| u.total_tokens).unwrap_or(0);
        debug!(
            "vision call ok: id={} total_tokens={}",
            parsed.id, total_tokens
        );

        Ok(ChatOutcome {
            content,
            response_id: parsed.id,
            total_tokens,
        })
    }
}

/// Transient failures retry; permanent ones (bad credential, bad request)
/// surface immediately.
fn is_retryable(err: &DocmarkError) -> bool {
    match err {
        DocmarkError::RequestFailed { .. } => true,
        DocmarkError::ApiError { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i < max)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}…", &s[..cut])
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text {
        text: &'a str,
    },
    ImageUrl {
        image_url: ImageUrl<'a>,
    },
}

#[derive(Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    id: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialises_with_type_tags() {
        let request = ChatRequest {
            model: "gpt-4.1",
            temperature: 0.0,
            max_tokens: 4096,
            messages: vec![RequestMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: "read this" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/png;base64,AAAA",
                            detail: Some("high"),
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["detail"],
            "high"
        );
    }

    #[test]
    fn detail_is_omitted_when_none() {
        let part = ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: "data:image/png;base64,AAAA",
                detail: None,
            },
        };
        let json = serde_json::to_value(&part).unwrap();
        assert!(json["image_url"].get("detail").is_none());
    }

    #[test]
    fn response_parses_content_and_usage() {
        let body = r##"{
            "id": "chatcmpl-123",
            "choices": [{"message": {"role": "assistant", "content": "# Page"}}],
            "usage": {"prompt_tokens": 900, "completion_tokens": 100, "total_tokens": 1000}
        }"##;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.id, "chatcmpl-123");
        assert_eq!(parsed.usage.unwrap().total_tokens, 1000);
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("# Page")
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(is_retryable(&DocmarkError::RequestFailed {
            detail: "timeout".into()
        }));
        assert!(is_retryable(&DocmarkError::ApiError {
            status: 429,
            detail: String::new()
        }));
        assert!(is_retryable(&DocmarkError::ApiError {
            status: 503,
            detail: String::new()
        }));
        assert!(!is_retryable(&DocmarkError::ApiError {
            status: 401,
            detail: String::new()
        }));
        assert!(!is_retryable(&DocmarkError::EmptyResponse {
            detail: String::new()
        }));
    }

    #[test]
    fn options_defaults() {
        let options = VisionOptions::new("sk-test");
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(options.model, "gpt-4o-mini");
        assert_eq!(options.max_tokens, 300);
        assert_eq!(options.timeout_secs, 60);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 300), "short");
        let long = "é".repeat(400);
        let cut = truncate(&long, 300);
        assert!(cut.ends_with('…'));
        assert!(cut.len() < long.len());
    }
}
