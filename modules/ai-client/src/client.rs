use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::StructuredOutput;
use crate::util::strip_code_blocks;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChatResponse {
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

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    /// Point at a different API root. Used by tests and proxies.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Plain text completion.
    pub async fn chat_text(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let content = self
            .complete(ChatRequest {
                model: &self.model,
                messages: messages(system, user),
                temperature,
                max_tokens,
                response_format: None,
            })
            .await?;
        Ok(content.trim().to_string())
    }

    /// JSON-object completion. The model is forced into JSON mode and the
    /// response is parsed before being returned.
    pub async fn chat_json(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<serde_json::Value> {
        let content = self
            .complete(ChatRequest {
                model: &self.model,
                messages: messages(system, user),
                temperature,
                max_tokens,
                response_format: Some(serde_json::json!({ "type": "json_object" })),
            })
            .await?;

        serde_json::from_str(strip_code_blocks(&content))
            .map_err(|e| anyhow!("Response was not valid JSON: {e}"))
    }

    /// Schema-constrained completion: the response format carries the JSON
    /// schema of `T`, and the reply must deserialize into `T`.
    pub async fn extract<T: StructuredOutput>(&self, system: &str, user: &str) -> Result<T> {
        let response_format = serde_json::json!({
            "type": "json_schema",
            "json_schema": {
                "name": <T as StructuredOutput>::schema_name(),
                "schema": T::response_schema(),
                "strict": true,
            }
        });

        let content = self
            .complete(ChatRequest {
                model: &self.model,
                messages: messages(system, user),
                temperature: 0.2,
                max_tokens: None,
                response_format: Some(response_format),
            })
            .await?;

        serde_json::from_str(strip_code_blocks(&content))
            .map_err(|e| anyhow!("Response did not match the {} schema: {e}", <T as StructuredOutput>::schema_name()))
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(model = %request.model, "OpenAI chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("No response from OpenAI"))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

fn messages<'a>(system: &'a str, user: &'a str) -> Vec<ChatMessage<'a>> {
    vec![
        ChatMessage {
            role: "system",
            content: system,
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}
