// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! LLM client abstraction for the judge and the response generator

use async_trait::async_trait;
use regex::Regex;
use rubriceval_core::Conversation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default completion budget for both providers
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Trait for LLM clients used by the judge and the generator
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Send a prompt and get a JSON value shaped by `schema`.
    ///
    /// The value is whatever the model produced; callers must still check
    /// that it actually honors the schema.
    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<Value, LLMError>;

    /// Continue `conversation` under `system_instruction` and return the text
    async fn generate_text(
        &self,
        conversation: &Conversation,
        system_instruction: &str,
    ) -> Result<String, LLMError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Errors from LLM clients
#[derive(Debug, Error)]
pub enum LLMError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Schema for rubric judgments: `{explanation, criteria_met}`
pub fn rubric_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "explanation": { "type": "string" },
            "criteria_met": { "type": "boolean" }
        },
        "required": ["explanation", "criteria_met"],
        "additionalProperties": false
    })
}

/// Schema for holistic ratings: `{explanation, rating}`
pub fn rating_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "explanation": { "type": "string" },
            "rating": { "type": "integer" }
        },
        "required": ["explanation", "rating"],
        "additionalProperties": false
    })
}

/// Sampling and transport settings shared by both providers
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    /// `None` leaves the provider default in place
    pub temperature: Option<f64>,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.0),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    fn from_fields(usage: &Value, input: &str, output: &str) -> Self {
        Self {
            prompt_tokens: usage[input].as_u64().unwrap_or(0),
            completion_tokens: usage[output].as_u64().unwrap_or(0),
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Send a request and decode the JSON body, mapping HTTP failures
async fn send_request(request: reqwest::RequestBuilder) -> Result<Value, LLMError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await?;
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LLMError::RateLimitExceeded);
        }
        return Err(LLMError::ApiError(format!("{}: {}", status, error_text)));
    }

    Ok(response.json().await?)
}

fn parse_json_content(content: &str) -> Result<Value, LLMError> {
    serde_json::from_str(content)
        .map_err(|e| LLMError::InvalidResponse(format!("content is not valid JSON: {}", e)))
}

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").ok())
        .as_ref()
}

/// Remove a surrounding markdown code fence such as ```` ```json ... ``` ````
pub fn strip_code_fences(text: &str) -> &str {
    fence_pattern()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| text.trim())
}

/// OpenAI client implementation
pub struct OpenAIClient {
    api_key: String,
    model: String,
    base_url: String,
    options: ClientOptions,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: "https://api.openai.com/v1".to_string(),
            options: ClientOptions::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    async fn chat(&self, mut request: Value) -> Result<String, LLMError> {
        request["model"] = json!(self.model);
        request["max_tokens"] = json!(self.options.max_tokens);
        if let Some(temperature) = self.options.temperature {
            request["temperature"] = json!(temperature);
        }

        let response_data = send_request(
            self.client
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .timeout(self.options.timeout)
                .json(&request),
        )
        .await?;

        let usage = TokenUsage::from_fields(&response_data["usage"], "prompt_tokens", "completion_tokens");
        debug!(model = %self.model, tokens = usage.total_tokens(), "OpenAI completion");

        response_data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(LLMError::InvalidResponse("Missing content".to_string()))
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<Value, LLMError> {
        let request = json!({
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "judgment",
                    "strict": true,
                    "schema": schema
                }
            }
        });

        let content = self.chat(request).await?;
        parse_json_content(&content)
    }

    async fn generate_text(
        &self,
        conversation: &Conversation,
        system_instruction: &str,
    ) -> Result<String, LLMError> {
        let mut messages = vec![json!({ "role": "system", "content": system_instruction })];
        messages.extend(
            conversation
                .turns()
                .iter()
                .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.content })),
        );

        self.chat(json!({ "messages": messages })).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Anthropic Claude client implementation
pub struct AnthropicClient {
    api_key: String,
    model: String,
    base_url: String,
    options: ClientOptions,
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: "https://api.anthropic.com/v1".to_string(),
            options: ClientOptions::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    async fn messages(&self, mut request: Value) -> Result<String, LLMError> {
        request["model"] = json!(self.model);
        request["max_tokens"] = json!(self.options.max_tokens);
        if let Some(temperature) = self.options.temperature {
            request["temperature"] = json!(temperature);
        }

        let response_data = send_request(
            self.client
                .post(format!("{}/messages", self.base_url))
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .timeout(self.options.timeout)
                .json(&request),
        )
        .await?;

        let usage = TokenUsage::from_fields(&response_data["usage"], "input_tokens", "output_tokens");
        debug!(model = %self.model, tokens = usage.total_tokens(), "Anthropic completion");

        response_data["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or(LLMError::InvalidResponse("Missing content".to_string()))
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn generate_json(&self, prompt: &str, schema: &Value) -> Result<Value, LLMError> {
        let prompt = format!(
            "{}\n\nReturn valid JSON matching this schema: {}",
            prompt, schema
        );
        let request = json!({
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let content = self.messages(request).await?;
        parse_json_content(strip_code_fences(&content))
    }

    async fn generate_text(
        &self,
        conversation: &Conversation,
        system_instruction: &str,
    ) -> Result<String, LLMError> {
        let messages: Vec<Value> = conversation
            .turns()
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.content }))
            .collect();

        self.messages(json!({
            "system": system_instruction,
            "messages": messages
        }))
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
