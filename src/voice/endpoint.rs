use super::encode::data_uri_payload;
use crate::config::VoiceConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::info;

/// One voice-counting request: the recorded clip plus context for the model
#[derive(Debug, Clone, Serialize)]
pub struct CountRequest {
    /// Audio as a `data:<mimetype>;base64,<data>` URI
    pub audio_data_uri: String,

    /// The mantra being chanted
    pub mantra: String,

    /// Nominal sample rate of the audio
    pub sample_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountResponse {
    /// The number of times the mantra was chanted
    pub count: u64,
}

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("endpoint request failed: {0}")]
    Http(String),

    #[error("endpoint returned a malformed count: {0}")]
    Schema(String),
}

/// The hosted counting endpoint
///
/// One opaque async call: the endpoint either returns a count conforming to
/// the `{count: number}` schema or the call fails. Never retried. Isolated
/// behind this trait so the counting flow is testable with a fake.
#[async_trait]
pub trait CountingEndpoint: Send + Sync {
    async fn count_mantras(&self, request: &CountRequest) -> Result<CountResponse, EndpointError>;
}

/// Counting through an OpenAI-style chat-completions endpoint
///
/// The recorded clip is attached as `input_audio` and a strict JSON schema
/// constrains the model to answer with the count alone.
pub struct HttpCountingEndpoint {
    client: Client,
    config: VoiceConfig,
}

impl HttpCountingEndpoint {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn build_body(&self, request: &CountRequest) -> Value {
        let instruction = format!(
            "You are an AI that counts the number of times a mantra is repeated \
             in an audio recording.\n\n\
             The mantra being chanted is: {}\n\n\
             The attached recording is a {} Hz audio clip.\n\n\
             Based on the audio, determine how many times the mantra was chanted.\n\n\
             Return ONLY the count. Do not include any other text. Do not explain \
             the count, or offer any other verbiage. Just the number, as JSON \
             matching {{\"count\": <number>}}.",
            request.mantra, request.sample_rate
        );

        json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": instruction },
                    {
                        "type": "input_audio",
                        "input_audio": {
                            "data": data_uri_payload(&request.audio_data_uri),
                            "format": "wav"
                        }
                    }
                ]
            }],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "voice_activated_counting",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "count": { "type": "number" }
                        },
                        "required": ["count"],
                        "additionalProperties": false
                    }
                }
            }
        })
    }
}

#[async_trait]
impl CountingEndpoint for HttpCountingEndpoint {
    async fn count_mantras(&self, request: &CountRequest) -> Result<CountResponse, EndpointError> {
        info!(
            "Sending counting request to {} (model={})",
            self.config.api_url, self.config.model
        );

        let mut builder = self.client.post(&self.config.api_url);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| EndpointError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EndpointError::Http(format!("{status}: {body}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| EndpointError::Http(e.to_string()))?;

        parse_count(&payload)
    }
}

/// Extract and validate the `{count: number}` answer from a chat-completions
/// response body
pub fn parse_count(payload: &Value) -> Result<CountResponse, EndpointError> {
    let content = payload["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| EndpointError::Schema("response has no message content".to_string()))?;

    let answer: Value = serde_json::from_str(content.trim())
        .map_err(|e| EndpointError::Schema(format!("content is not JSON: {e}")))?;

    let count = answer["count"]
        .as_f64()
        .ok_or_else(|| EndpointError::Schema("missing numeric count".to_string()))?;

    if !count.is_finite() || count < 0.0 {
        return Err(EndpointError::Schema(format!("count out of range: {count}")));
    }

    Ok(CountResponse {
        count: count.round() as u64,
    })
}
