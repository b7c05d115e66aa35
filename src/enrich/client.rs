//! Chat-completion client for OpenAI-compatible endpoints.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EnrichmentConfig;

use super::{EnrichError, EnrichResult, TextGenerator};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum Role {
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: Role,
    content: String,
}

impl Message {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Read the API key from the named environment variable.
pub fn api_key_from_env(env_var: &str) -> EnrichResult<String> {
    env::var(env_var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| EnrichError::MissingApiKey {
            env_var: env_var.to_string(),
        })
}

/// Async client for a chat-completion endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl ChatClient {
    pub fn new(config: &EnrichmentConfig, api_key: impl Into<String>) -> EnrichResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key: api_key.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> EnrichResult<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Message::user(prompt)],
            max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EnrichError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| EnrichError::Parse("no response choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn config(api_url: String) -> EnrichmentConfig {
        EnrichmentConfig {
            api_url,
            model: "test-model".to_string(),
            ..EnrichmentConfig::default()
        }
    }

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: "m",
            messages: vec![Message::user("hi")],
            max_tokens: 30,
            temperature: 0.7,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
        assert_eq!(value["max_tokens"], 30);
    }

    #[test]
    fn test_missing_api_key() {
        let err = api_key_from_env("A11YCHECK_TEST_KEY_THAT_IS_NEVER_SET").unwrap_err();
        assert!(matches!(err, EnrichError::MissingApiKey { .. }));
    }

    #[tokio::test]
    async fn test_generate_reads_first_choice() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({
                    "choices": [{
                        "message": {
                            "role": "assistant",
                            "content": format!("{}|{}|{}", auth, body["model"], body["max_tokens"])
                        }
                    }]
                }))
            }),
        );
        let client = ChatClient::new(&config(spawn(app).await), "secret").unwrap();

        let text = client.generate("prompt", 42).await.unwrap();
        assert_eq!(text, "Bearer secret|\"test-model\"|42");
    }

    #[tokio::test]
    async fn test_generate_maps_error_status() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let client = ChatClient::new(&config(spawn(app).await), "secret").unwrap();

        match client.generate("prompt", 10).await {
            Err(EnrichError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "slow down");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_choices() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let client = ChatClient::new(&config(spawn(app).await), "secret").unwrap();

        let err = client.generate("prompt", 10).await.unwrap_err();
        assert!(matches!(err, EnrichError::Parse(_)));
    }
}
