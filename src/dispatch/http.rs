use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::dispatch::{Call, Target};
use crate::error::FanoutError;

pub const MAX_RESPONSE_BYTES: usize = 2 * 1024 * 1024; // 2MB

/// Posts the shared payload to the target endpoint.
pub struct HttpDispatch {
    client: Client,
    target: Target,
    payload: Arc<Value>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    content: Option<Value>,
}

impl HttpDispatch {
    pub fn new(target: Target, payload: Arc<Value>) -> Result<Self, FanoutError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| FanoutError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            target,
            payload,
        })
    }

    async fn post(&self) -> Result<Value, FanoutError> {
        let mut request = self
            .client
            .post(&self.target.endpoint)
            .header("Authorization", format!("Bearer {}", self.target.api_key))
            .header("Content-Type", "application/json")
            .json(self.payload.as_ref());
        if let Some(timeout) = self.target.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        // Any non-success status is a failure; cap how much of the body we keep.
        if !status.is_success() {
            let error_bytes = response.bytes().await.unwrap_or_default();
            let truncated = &error_bytes[..error_bytes.len().min(MAX_RESPONSE_BYTES)];
            return Err(FanoutError::Upstream {
                status: status.as_u16(),
                body: String::from_utf8_lossy(truncated).into_owned(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(FanoutError::ResponseTooLarge {
                size: bytes.len(),
                max: MAX_RESPONSE_BYTES,
            });
        }

        decode_completion(&bytes)
    }

    fn classify(&self, e: reqwest::Error) -> FanoutError {
        match self.target.timeout {
            Some(timeout) if e.is_timeout() => FanoutError::Timeout(timeout.as_millis() as u64),
            _ => FanoutError::Request(e),
        }
    }
}

impl Call for HttpDispatch {
    async fn call(&self, _index: usize) -> Result<Value, FanoutError> {
        self.post().await
    }

    fn endpoint(&self) -> Option<&str> {
        Some(&self.target.endpoint)
    }
}

/// Decode an OpenAI-style envelope into the model's answer.
///
/// The envelope must be JSON. `choices[0].message.content` is then parsed as
/// JSON itself; content that is not JSON is kept as `{"raw": content}`, and a
/// missing or null content yields `null`.
pub fn decode_completion(body: &[u8]) -> Result<Value, FanoutError> {
    let completion: ChatCompletion = serde_json::from_slice(body)
        .map_err(|e| FanoutError::SchemaParse(format!("failed to parse response: {e}")))?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content);

    Ok(match content {
        Some(Value::String(text)) => parse_content(text),
        Some(other) => other,
        None => Value::Null,
    })
}

fn parse_content(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(_) => json!({ "raw": text }),
    }
}
