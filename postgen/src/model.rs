//! Model invocation boundary
//!
//! The pipeline only ever sees [`ModelClient`]: given a prompt, return raw
//! text or fail with a [`ModelError`]. Any hosted model satisfying that
//! contract is interchangeable. [`HttpModelClient`] is the production
//! implementation, speaking the OpenAI-style chat-completions shape with
//! the credential injected through [`ModelConfig`] at construction time.

use crate::types::{ModelConfig, ModelError};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError>;
}

pub struct HttpModelClient {
    http: reqwest::Client,
    config: ModelConfig,
}

impl std::fmt::Debug for HttpModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The api_key never appears in debug output.
        f.debug_struct("HttpModelClient")
            .field("base_url", &self.config.base_url)
            .field("model_name", &self.config.model_name)
            .field("request_timeout", &self.config.request_timeout)
            .finish()
    }
}

impl HttpModelClient {
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ModelError::Http(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        let body = json!({
            "model": self.config.model_name,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });

        debug!("Invoking model {} at {}", self.config.model_name, self.endpoint());

        let request = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send();

        let response = tokio::time::timeout(self.config.request_timeout, request)
            .await
            .map_err(|_| ModelError::Timeout {
                timeout: self.config.request_timeout,
            })?
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout: self.config.request_timeout,
                    }
                } else {
                    ModelError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ModelError::Http(e.to_string()))?;

        let content = payload
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        Ok(content.to_string())
    }
}
