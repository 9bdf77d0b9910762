use async_trait::async_trait;
use flowchart::{GenerationError, TextGenerator};
use serde::{Deserialize, Serialize};

use crate::LlmConfig;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// [`TextGenerator`] over an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl ChatCompletionsClient {
    /// Creates a client with its own connection pool.
    pub fn new(config: LlmConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Creates a client sharing an existing [`reqwest::Client`].
    pub fn with_http_client(http: reqwest::Client, config: LlmConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_url)
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        let body = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.http.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "sending chat completion request");

        let response = request.send().await.map_err(unavailable)?;
        let status = response.status();
        let text = response.text().await.map_err(unavailable)?;

        if !status.is_success() {
            tracing::warn!(status = %status, body = %text, "chat completion request failed");
            return Err(GenerationError::Unavailable {
                message: format!("upstream returned {status}"),
            });
        }

        parse_completion(&text)
    }
}

fn unavailable(e: reqwest::Error) -> GenerationError {
    tracing::warn!(error = %e, "chat completion transport failure");
    GenerationError::Unavailable {
        message: e.to_string(),
    }
}

/// Pulls the first choice's text out of a chat-completions response body.
fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Unavailable {
            message: format!("malformed completion response: {e}"),
        })?;

    match response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
    {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::Empty),
    }
}
