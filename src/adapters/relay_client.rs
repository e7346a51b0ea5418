use crate::domain::model::{Matrix, StatisticsResult};
use crate::domain::ports::{ConfigProvider, StatisticsRelay};
use crate::utils::error::{AppError, RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct LoginPayload<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsPayload<'a> {
    data: &'a [Vec<i64>],
    original_diagonal: bool,
}

/// HTTP client for the downstream statistics service.
#[derive(Debug, Clone)]
pub struct RelayClient {
    base_url: String,
    client: Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.node_api_url(), config.relay_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl StatisticsRelay for RelayClient {
    async fn authenticate(&self, identity: &str, secret: &str) -> std::result::Result<String, RelayError> {
        let url = self.endpoint("/login");
        tracing::debug!("🔑 Logging in to downstream at {} as {}", url, identity);

        let response = self
            .client
            .post(&url)
            .json(&LoginPayload {
                username: identity,
                password: secret,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::AuthFailed {
                status: status.as_u16(),
                body,
            });
        }

        let reply: LoginReply = serde_json::from_str(&body)
            .map_err(|e| RelayError::DecodeError(format!("login response: {}", e)))?;

        match reply.token {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(RelayError::EmptyToken),
        }
    }

    async fn send_statistics(
        &self,
        rotated: &Matrix,
        original_diagonal: bool,
        token: &str,
    ) -> std::result::Result<StatisticsResult, RelayError> {
        let url = self.endpoint("/api/statistics");
        tracing::debug!(
            "📡 Sending {}x{} matrix to {}",
            rotated.len(),
            rotated.first().map_or(0, Vec::len),
            url
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&StatisticsPayload {
                data: rotated,
                original_diagonal,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Downstream statistics response status: {}", status);

        if !status.is_success() {
            return Err(RelayError::RelayFailed {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(serde_json::Value::Object(statistics)) => Ok(statistics),
            Ok(other) => Err(RelayError::DecodeError(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(RelayError::DecodeError(format!("statistics response: {}", e))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
