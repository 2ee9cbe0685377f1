//! Gemini `generateContent` backend.
//!
//! Non-streaming calls hit `models/{model}:generateContent`; streaming calls
//! hit `models/{model}:streamGenerateContent?alt=sse` and decode the event
//! stream incrementally. The API key travels in the `x-goog-api-key` header.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use gsearch_core::api::{
    AnswerEngine, AnswerRequest, BackendConfig, ChunkStream, EngineError, SearchConfig,
    ToolCapability,
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::stream::SseDecoder;

const API_KEY_HEADER: &str = "x-goog-api-key";
const BODY_SNIPPET_LEN: usize = 200;

pub struct GeminiEngine {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    request_timeout: Duration,
}

impl GeminiEngine {
    /// Resolves the API key from config and environment.
    pub fn new(search: &SearchConfig, backend: &BackendConfig) -> Result<Self, EngineError> {
        let api_key = backend
            .resolve_api_key()
            .ok_or_else(|| EngineError::MissingApiKey {
                env: backend.api_key_env.clone(),
            })?;
        Self::with_key(search, backend, api_key)
    }

    pub fn with_key(
        search: &SearchConfig,
        backend: &BackendConfig,
        api_key: String,
    ) -> Result<Self, EngineError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(backend.connect_timeout_secs))
            .build()
            .map_err(|e| EngineError::Client(e.into()))?;

        Ok(Self {
            client,
            base_url: backend.base_url.trim_end_matches('/').to_string(),
            model: search.model.clone(),
            api_key,
            request_timeout: Duration::from_secs(backend.request_timeout_secs),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint_url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, self.model, method)
    }

    /// `total_timeout` bounds the whole exchange; streams pass `None` so a
    /// long answer is not cut off mid-body.
    fn build_post(
        &self,
        url: &str,
        request: &AnswerRequest,
        total_timeout: Option<Duration>,
    ) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&build_request_body(request));
        match total_timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        }
    }

    async fn post(
        &self,
        url: &str,
        request: &AnswerRequest,
        total_timeout: Option<Duration>,
    ) -> Result<reqwest::Response, EngineError> {
        tracing::debug!(target: "gsearch.engine", model = %self.model, url, "sending gemini request");

        let response = self
            .build_post(url, request, total_timeout)
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &text));
        }
        Ok(response)
    }
}

#[async_trait]
impl AnswerEngine for GeminiEngine {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &AnswerRequest) -> Result<String, EngineError> {
        let url = self.endpoint_url("generateContent");
        let response = self.post(&url, request, Some(self.request_timeout)).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::Decode(e.into()))?;
        Ok(extract_text(&body))
    }

    async fn generate_stream(&self, request: &AnswerRequest) -> Result<ChunkStream, EngineError> {
        let url = format!("{}?alt=sse", self.endpoint_url("streamGenerateContent"));
        let response = self.post(&url, request, None).await?;

        let chunks = async_stream::stream! {
            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::new();
            'read: loop {
                let payloads = match bytes.next().await {
                    Some(Ok(chunk)) => decoder.feed(&chunk),
                    Some(Err(e)) => {
                        yield Err(EngineError::Stream(e.to_string()));
                        break 'read;
                    }
                    None => {
                        if let Some(tail) = decoder.finish() {
                            match stream_chunk_text(&tail) {
                                Ok(Some(text)) => yield Ok(text),
                                Ok(None) => {}
                                Err(e) => yield Err(e),
                            }
                        }
                        break 'read;
                    }
                };
                for payload in payloads {
                    match stream_chunk_text(&payload) {
                        Ok(Some(text)) => yield Ok(text),
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            break 'read;
                        }
                    }
                }
            }
        };
        Ok(chunks.boxed())
    }
}

pub(crate) fn build_request_body(request: &AnswerRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }],
        }],
    });

    if !request.system_instruction.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": request.system_instruction }] });
    }
    if !request.tools.is_empty() {
        let tools: Vec<Value> = request
            .tools
            .iter()
            .map(|t| match t {
                ToolCapability::WebSearch => json!({ "googleSearch": {} }),
                ToolCapability::UrlContext => json!({ "urlContext": {} }),
            })
            .collect();
        body["tools"] = Value::Array(tools);
    }
    if let Some(budget) = request.thinking_budget {
        body["generationConfig"] = json!({ "thinkingConfig": { "thinkingBudget": budget } });
    }
    body
}

/// Concatenated text parts of the first candidate, thought parts excluded.
pub(crate) fn extract_text(body: &Value) -> String {
    let Some(parts) = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
    else {
        return String::new();
    };
    parts
        .iter()
        .filter(|p| !p.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect()
}

/// Text carried by one SSE payload; `None` for chunks without text
/// (metadata, grounding, thought parts).
fn stream_chunk_text(payload: &str) -> Result<Option<String>, EngineError> {
    let value: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            let preview: String = payload.chars().take(BODY_SNIPPET_LEN).collect();
            tracing::warn!(
                target: "gsearch.engine",
                error = %e,
                data_preview = %preview,
                "failed to parse gemini stream chunk"
            );
            return Ok(None);
        }
    };

    if let Some(err) = value.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(EngineError::Stream(message.to_string()));
    }

    let text = extract_text(&value);
    Ok((!text.is_empty()).then_some(text))
}

pub(crate) fn map_http_error(status: StatusCode, body: &str) -> EngineError {
    match status.as_u16() {
        401 | 403 => EngineError::Unauthorized,
        429 => EngineError::RateLimited,
        code => EngineError::HttpStatus {
            status: code,
            body_snippet: body.chars().take(BODY_SNIPPET_LEN).collect(),
        },
    }
}
