use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::config::OracleConfig;
use crate::model::{ChatMessage, CompletionOracle, CompletionRequest, ModelError, StreamDelta};

pub struct OpenAiCompatClient {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    client: reqwest::Client,
    provider_name: &'static str,
}

impl OpenAiCompatClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Request(format!("failed to build http client: {e}")))?;
        Ok(Self {
            api_key,
            model,
            base_url,
            client,
            provider_name: "openai",
        })
    }

    pub fn from_config(config: &OracleConfig) -> Result<Self, ModelError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ModelError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;
        Self::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            config.timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, req: &CompletionRequest, stream: bool) -> OpenAiChatRequest {
        OpenAiChatRequest {
            model: self.model.clone(),
            messages: req.messages.clone(),
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            stream,
        }
    }

    async fn send(&self, body: &OpenAiChatRequest) -> Result<reqwest::Response, ModelError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        tracing::debug!("{} API response: status={}", self.provider_name, status);

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ModelError::Auth(format!(
                "{} auth failed ({status}). Check API key and account access.",
                self.provider_name
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelError::Request(format!(
                "{} error {status}: {text}",
                self.provider_name
            )));
        }

        Ok(response)
    }

    async fn run_chat(&self, req: &CompletionRequest) -> Result<OpenAiResponseMessage, ModelError> {
        let response = self.send(&self.request_body(req, false)).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let parsed: OpenAiChatResponse = serde_json::from_str(&text).map_err(|e| {
            ModelError::InvalidResponse(format!("{} parse failed: {e}", self.provider_name))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| {
                ModelError::InvalidResponse(format!(
                    "missing choices[0].message from {} response",
                    self.provider_name
                ))
            })
    }

    /// Stream a completion, forwarding deltas to `on_delta` as they arrive.
    /// Returns the full reply text once the stream ends.
    pub async fn complete_streaming<F>(
        &self,
        req: CompletionRequest,
        mut on_delta: F,
    ) -> Result<String, ModelError>
    where
        F: FnMut(StreamDelta) -> Result<(), String> + Send,
    {
        let response = self.send(&self.request_body(&req, true)).await?;

        let mut content = String::new();
        let mut stream = response.bytes_stream();
        let mut lines = SseLineBuffer::default();
        let mut done = false;

        'read: while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| ModelError::Request(e.to_string()))?;
            lines.push(&bytes);

            while let Some(line) = lines.next_line()? {
                if process_openai_stream_line(&line, &mut content, &mut on_delta)? {
                    done = true;
                    break 'read;
                }
            }
        }

        if !done {
            if let Some(rest) = lines.finish()? {
                process_openai_stream_line(&rest, &mut content, &mut on_delta)?;
            }
        }

        if content.trim().is_empty() {
            return Err(ModelError::InvalidResponse(format!(
                "{} returned an empty reply",
                self.provider_name
            )));
        }
        Ok(content)
    }
}

impl CompletionOracle for OpenAiCompatClient {
    fn model_id(&self) -> String {
        self.model.clone()
    }

    async fn complete(&self, req: CompletionRequest) -> Result<String, ModelError> {
        let message = self.run_chat(&req).await?;
        match message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(ModelError::InvalidResponse(format!(
                "{} returned an empty reply",
                self.provider_name
            ))),
        }
    }
}

/// Splits a byte stream into SSE lines. Bytes are kept raw until a full line
/// is buffered, so a character split across network chunks decodes intact.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    fn next_line(&mut self) -> Result<Option<String>, ModelError> {
        let Some(newline_idx) = self.pending.iter().position(|b| *b == b'\n') else {
            return Ok(None);
        };
        let raw: Vec<u8> = self.pending.drain(..=newline_idx).collect();
        decode_line(&raw).map(Some)
    }

    /// Whatever is left once the stream ends without a trailing newline.
    fn finish(&mut self) -> Result<Option<String>, ModelError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let raw = std::mem::take(&mut self.pending);
        decode_line(&raw).map(Some)
    }
}

fn decode_line(raw: &[u8]) -> Result<String, ModelError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| ModelError::InvalidResponse(format!("stream line is not UTF-8: {e}")))?;
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}

/// Handle one SSE line. Returns `true` once the `[DONE]` sentinel is seen.
/// Content deltas are appended to `content`; reasoning deltas only go to
/// `on_delta`.
pub fn process_openai_stream_line(
    line: &str,
    content: &mut String,
    on_delta: &mut (dyn FnMut(StreamDelta) -> Result<(), String> + Send),
) -> Result<bool, ModelError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') || trimmed.starts_with("event:") {
        return Ok(false);
    }

    let payload = trimmed
        .strip_prefix("data:")
        .map(|s| s.trim())
        .unwrap_or(trimmed);

    if payload.is_empty() || payload == "[DONE]" {
        return Ok(payload == "[DONE]");
    }

    let chunk: OpenAiStreamChunk = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(_) => return Ok(false),
    };

    for choice in chunk.choices {
        let Some(delta) = choice.delta else {
            continue;
        };
        if let Some(delta_content) = delta.content.filter(|c| !c.is_empty()) {
            content.push_str(&delta_content);
            on_delta(StreamDelta::Content(delta_content)).map_err(ModelError::Request)?;
        }
        if let Some(delta_reasoning) = delta.reasoning_content.filter(|r| !r.is_empty()) {
            on_delta(StreamDelta::Reasoning(delta_reasoning)).map_err(ModelError::Request)?;
        }
    }

    Ok(false)
}

#[derive(Debug, Serialize)]
pub struct OpenAiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAiResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiChatResponse {
    pub choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    pub message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiStreamChunk {
    #[serde(default)]
    pub choices: Vec<OpenAiStreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiStreamChoice {
    #[serde(default)]
    pub delta: Option<OpenAiStreamDelta>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OpenAiStreamDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}
