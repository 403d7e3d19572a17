//! Feedback over an OpenAI-compatible chat completions API.
//!
//! POST `{endpoint}/v1/chat/completions`, non-streaming. Works against
//! OpenAI itself and against local servers such as Ollama that expose the
//! same route.

use std::time::{Duration, Instant};

use reader_core::FeedbackAnnotation;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::FeedbackConfig;
use crate::error::{FeedbackError, make_snippet};
use crate::prompts;
use crate::service::FeedbackService;

#[derive(Debug)]
pub struct ChatFeedbackClient {
    client: reqwest::Client,
    config: FeedbackConfig,
    url_chat: String,
}

impl ChatFeedbackClient {
    /// Validate `config` and build an HTTP client with its timeout and
    /// default headers.
    pub fn new(config: FeedbackConfig) -> Result<Self, FeedbackError> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| FeedbackError::config("api_key", format!("not a valid header: {e}")))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        let url_chat = chat_url(&config.endpoint);

        info!(
            model = %config.model,
            endpoint = %config.endpoint,
            timeout_secs = config.timeout_secs,
            has_api_key = config.api_key.is_some(),
            "ChatFeedbackClient initialized"
        );

        Ok(Self {
            client,
            config,
            url_chat,
        })
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    /// Single chat completion with `prompt` as the user message.
    pub async fn complete(&self, prompt: &str) -> Result<String, FeedbackError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::new(&self.config, prompt);

        debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            has_system = self.config.system_prompt.is_some(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            let snippet = make_snippet(&text);
            error!(
                %status,
                url = %self.url_chat,
                %snippet,
                model = %self.config.model,
                latency_ms = started.elapsed().as_millis(),
                "chat completion returned non-success status"
            );
            return Err(FeedbackError::Status {
                status,
                url: self.url_chat.clone(),
                snippet,
            });
        }

        let content = parse_chat_response(&text).inspect_err(|e| {
            error!(
                error = %e,
                model = %self.config.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to read chat completion response"
            );
        })?;

        info!(
            model = %self.config.model,
            latency_ms = started.elapsed().as_millis(),
            response_len = content.len(),
            "chat completion completed"
        );
        Ok(content)
    }
}

impl FeedbackService for ChatFeedbackClient {
    async fn annotation_guide(&self, source: &str) -> Result<String, FeedbackError> {
        self.complete(&prompts::annotation_guide(source)).await
    }

    async fn summary_feedback(&self, source: &str, summary: &str) -> Result<String, FeedbackError> {
        self.complete(&prompts::summary_feedback(source, summary))
            .await
    }

    async fn annotation_feedback(
        &self,
        source: &str,
        annotations: &[FeedbackAnnotation],
    ) -> Result<String, FeedbackError> {
        self.complete(&prompts::annotation_feedback(source, annotations))
            .await
    }
}

fn chat_url(endpoint: &str) -> String {
    format!("{}/v1/chat/completions", endpoint.trim().trim_end_matches('/'))
}

/// Pull `choices[0].message.content` out of a completion body.
fn parse_chat_response(body: &str) -> Result<String, FeedbackError> {
    let out: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        FeedbackError::Decode(format!(
            "serde error: {e}; expected `choices[0].message.content`"
        ))
    })?;
    out.choices
        .into_iter()
        .find_map(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(FeedbackError::EmptyResponse)
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(config: &'a FeedbackConfig, prompt: &'a str) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = config.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });
        Self {
            model: &config.model,
            messages,
            temperature: config.temperature,
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}
