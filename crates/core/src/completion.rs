use anyhow::{Context, Result};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a chat-completions request.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub content: String,
}

impl LlmResponse {
    /// Returns the trimmed text of the first choice. Everything else in the
    /// response is ignored.
    pub fn into_text(self) -> Result<String> {
        let first = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No response from LLM"))?;
        Ok(first.message.content.trim().to_string())
    }
}

// Everything that talks to the hosted model goes through this trait, so the
// coach can be exercised in tests with `MockCompletionClient` instead of
// making network calls.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String>;
}

pub struct OpenAiClient {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: SecretString, model: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature,
            messages: &messages,
        };
        tracing::debug!(
            model = %self.model,
            temperature,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("Chat completion request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Chat completion returned {status}: {}",
                text.trim()
            ));
        }

        resp.json::<LlmResponse>()
            .await
            .context("Failed to decode chat completion response")?
            .into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_request_body_matches_chat_completions_shape() {
        let messages = vec![
            ChatMessage::system("You are a professional technical interviewer."),
            ChatMessage::user("Generate 2 easy level interview questions."),
        ];
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            temperature: 0.7,
            messages: &messages,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(
            json["messages"][1]["content"],
            "Generate 2 easy level interview questions."
        );
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_is_first_choice_trimmed() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  Yes.\n" } },
                { "index": 1, "message": { "role": "assistant", "content": "No" } }
            ],
            "usage": { "total_tokens": 12 }
        }"#;
        let resp: LlmResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.into_text().unwrap(), "Yes.");
    }

    #[test]
    fn test_response_without_choices_is_an_error() {
        let resp: LlmResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(resp.into_text().is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = OpenAiClient::new(SecretString::from("sk-test".to_string()), "gpt-4o".to_string())
            .unwrap()
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(client.model(), "gpt-4o");
    }

    // Live call against the OpenAI API. Ignored by default so `cargo test`
    // runs without a key; use `cargo test -- --ignored` to run it.
    #[tokio::test]
    #[ignore]
    async fn test_live_completion() {
        dotenvy::dotenv_override().ok();
        let api_key = env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let client =
            OpenAiClient::new(SecretString::from(api_key), DEFAULT_CHAT_MODEL.to_string()).unwrap();

        let reply = client
            .complete(
                vec![ChatMessage::user("Reply with the single word: pong")],
                0.0,
            )
            .await
            .expect("completion failed");
        assert!(reply.to_lowercase().contains("pong"));
    }
}
