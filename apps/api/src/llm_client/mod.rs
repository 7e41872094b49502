/// LLM Client — the single point of entry for completion-service calls in TalentScout.
///
/// No other module talks to the Groq API directly. Interview logic depends on the
/// `CompletionClient` trait so it can run against a scripted client in tests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::interview::transcript::Transcript;

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 400;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion service credential is missing")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion call timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Generates the assistant's next turn in an interview.
///
/// Exactly one upstream call per invocation: no caching, no retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        latest_input: &str,
        transcript: &Transcript,
        tech_stack: &str,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Returns the trimmed text of the first choice, if it has any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Groq chat-completions client (OpenAI-compatible wire format).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    api_url: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        model: String,
        api_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential);
        }
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            api_url,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a single prompt and returns the trimmed reply text.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        match tokio::time::timeout(self.timeout, self.send(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| self.classify(e))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .text()
            .map(String::from)
            .ok_or(LlmError::EmptyContent)
    }

    fn classify(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Http(e)
        }
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(
        &self,
        latest_input: &str,
        transcript: &Transcript,
        tech_stack: &str,
    ) -> Result<String, LlmError> {
        let prompt = prompts::build_interview_prompt(tech_stack, &transcript.serialize(), latest_input);
        self.call(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ChatCompletionResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_new_rejects_blank_credential() {
        let result = LlmClient::new(
            "  ".to_string(),
            DEFAULT_MODEL.to_string(),
            DEFAULT_API_URL.to_string(),
            Duration::from_secs(30),
        );
        assert!(matches!(result, Err(LlmError::MissingCredential)));
    }

    #[test]
    fn test_new_keeps_configured_model() {
        let client = LlmClient::new(
            "gsk_test".to_string(),
            "mixtral-8x7b".to_string(),
            DEFAULT_API_URL.to_string(),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(client.model(), "mixtral-8x7b");
    }

    #[test]
    fn test_response_text_is_trimmed() {
        let response = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":"  What is a mutex?\n"}}],
                "usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#,
        );
        assert_eq!(response.text(), Some("What is a mutex?"));
    }

    #[test]
    fn test_response_without_content_has_no_text() {
        assert_eq!(parse(r#"{"choices":[]}"#).text(), None);
        assert_eq!(
            parse(r#"{"choices":[{"message":{"content":"   "}}]}"#).text(),
            None
        );
        assert_eq!(
            parse(r#"{"choices":[{"message":{"content":null}}]}"#).text(),
            None
        );
    }

    #[test]
    fn test_request_carries_sampling_settings() {
        let body = serde_json::to_value(ChatCompletionRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        })
        .unwrap();
        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["max_tokens"], 400);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    // Local stand-in for the provider: accepts one connection, reads the full
    // request, then answers with `status` and `body` (or never answers).
    async fn serve_once(status: &'static str, body: &'static str, stall: bool) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/openai/v1/chat/completions", listener.local_addr().unwrap());

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            if stall {
                tokio::time::sleep(Duration::from_secs(10)).await;
                return;
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        url
    }

    fn client_for(url: String, timeout: Duration) -> LlmClient {
        LlmClient::new(
            "gsk_test".to_string(),
            DEFAULT_MODEL.to_string(),
            url,
            timeout,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_call_returns_trimmed_reply() {
        let url = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"\n What is a B-tree? "}}],"usage":{"prompt_tokens":12,"completion_tokens":6}}"#,
            false,
        )
        .await;
        let reply = client_for(url, Duration::from_secs(5))
            .call("prompt")
            .await
            .unwrap();
        assert_eq!(reply, "What is a B-tree?");
    }

    #[tokio::test]
    async fn test_error_status_parses_provider_message() {
        let url = serve_once(
            "503 Service Unavailable",
            r#"{"error":{"message":"over capacity","type":"server_error"}}"#,
            false,
        )
        .await;
        match client_for(url, Duration::from_secs(5)).call("prompt").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "over capacity");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_keeps_unparseable_body() {
        let url = serve_once("401 Unauthorized", "invalid key", false).await;
        match client_for(url, Duration::from_secs(5)).call("prompt").await {
            Err(LlmError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid key");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_first_choice_is_empty_content() {
        let url = serve_once("200 OK", r#"{"choices":[{"message":{"content":"   "}}]}"#, false).await;
        assert!(matches!(
            client_for(url, Duration::from_secs(5)).call("prompt").await,
            Err(LlmError::EmptyContent)
        ));
    }

    #[tokio::test]
    async fn test_stalled_service_times_out() {
        let url = serve_once("200 OK", "", true).await;
        let timeout = Duration::from_secs(1);
        match client_for(url, timeout).call("prompt").await {
            Err(LlmError::Timeout(after)) => assert_eq!(after, timeout),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_returns_service_reply() {
        let url = serve_once("200 OK", r#"{"choices":[{"message":{"content":"Q?"}}]}"#, false).await;
        let mut transcript = Transcript::new();
        transcript.append(crate::interview::models::Message::assistant("Welcome").unwrap());
        let reply = client_for(url, Duration::from_secs(5))
            .complete("", &transcript, "Rust")
            .await
            .unwrap();
        assert_eq!(reply, "Q?");
    }
}
