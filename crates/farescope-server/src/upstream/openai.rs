use super::{http_client, InsightModel, UpstreamError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "openai";

/// Chat-completions client.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http: http_client(timeout),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1000,
            temperature: 0.7,
            timeout,
        }
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl InsightModel for OpenAiClient {
    fn name(&self) -> &'static str {
        SERVICE
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, UpstreamError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt}
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        debug!("POST {} (model {})", self.url(), self.model);
        let resp = self
            .http
            .post(self.url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, self.timeout, e))?;
        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| UpstreamError::Malformed {
            service: SERVICE,
            reason: e.to_string(),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| UpstreamError::Malformed {
                service: SERVICE,
                reason: "no completion content".to_string(),
            })
    }
}
