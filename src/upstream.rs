//! Outbound HTTP to the launch-library, news and ISS APIs.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

use crate::config::REQUEST_TIMEOUT_SECS;
use crate::errors::UpstreamError;

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Performs a `GET` and returns the decoded JSON body of a successful response.
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError>;
}

struct ApiToken {
    base_url: String,
    token: String,
}

pub struct HttpUpstream {
    client: reqwest::Client,
    api_token: Option<ApiToken>,
    timeout: Duration,
}

impl HttpUpstream {
    pub fn new() -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("launchlist-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_token: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        })
    }

    /// Sends `Authorization: Token <token>` on requests under `base_url` only.
    pub fn with_api_token(mut self, base_url: &str, token: &str) -> Self {
        self.api_token = Some(ApiToken {
            base_url: base_url.to_string(),
            token: token.to_string(),
        });
        self
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        let mut request = self.client.get(url);
        if let Some(api_token) = &self.api_token {
            if url.starts_with(&api_token.base_url) {
                request = request.header(AUTHORIZATION, format!("Token {}", api_token.token));
            }
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match timeout(self.timeout, exchange).await {
            Ok(result) => result.map_err(|e| {
                error!("Error requesting {}: {}", url, e);
                UpstreamError::Transport(e.to_string())
            })?,
            Err(_) => {
                error!("Request to {} timed out after {:?}", url, self.timeout);
                return Err(UpstreamError::Timeout);
            }
        };

        debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

const MAX_ERROR_BODY_CHARS: usize = 500;

/// Prefers the upstream's own error text, falling back to the status code.
fn error_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for field in ["detail", "message", "error"] {
            if let Some(Value::String(text)) = fields.get(field) {
                return text.clone();
            }
        }
    } else if !body.is_empty() && !body.starts_with('<') {
        return body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    }
    format!("Request failed with status code {}", status)
}
