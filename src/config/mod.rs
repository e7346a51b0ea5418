pub mod toml_config;

use crate::adapters::relay_client::DEFAULT_RELAY_TIMEOUT;
use crate::core::{ConfigProvider, Credentials};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_secret, validate_non_empty_string, validate_range,
    validate_required_field, validate_url, Validate,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

/// 下游 token 快取最長一天
pub const MAX_TOKEN_CACHE_TTL_SECS: u64 = 86_400;

#[derive(Clone, Parser)]
#[command(name = "matrix-relay")]
#[command(about = "Rotates matrices and relays them to the statistics service")]
pub struct CliConfig {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "LOGIN_USERNAME", default_value = "admin")]
    pub login_username: String,

    #[arg(long, env = "LOGIN_PASSWORD", default_value = "password", hide_env_values = true)]
    pub login_password: String,

    #[arg(long, env = "NODE_API_URL", default_value = "http://localhost:3000")]
    pub node_api_url: String,

    #[arg(long, env = "NODE_API_USERNAME", default_value = "admin")]
    pub node_api_username: String,

    #[arg(long, env = "NODE_API_PASSWORD", default_value = "password", hide_env_values = true)]
    pub node_api_password: String,

    #[arg(long, env = "RELAY_TIMEOUT_SECS", default_value_t = DEFAULT_RELAY_TIMEOUT.as_secs())]
    pub relay_timeout_secs: u64,

    #[arg(long, env = "TOKEN_CACHE_TTL_SECS", default_value_t = 0)]
    pub token_cache_ttl_secs: u64,

    #[arg(long, env = "RELAY_CONFIG", help = "TOML file overriding flags and environment")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "JSON_LOGS", help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("port", &self.port)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("login_username", &self.login_username)
            .field("node_api_url", &self.node_api_url)
            .field("node_api_username", &self.node_api_username)
            .field("relay_timeout_secs", &self.relay_timeout_secs)
            .field("token_cache_ttl_secs", &self.token_cache_ttl_secs)
            .field("config", &self.config)
            .field("verbose", &self.verbose)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl CliConfig {
    /// 若指定了 `--config`，以檔案中的值覆蓋旗標與環境變數
    pub fn load_file_overrides(mut self) -> Result<Self> {
        if let Some(path) = self.config.clone() {
            let file = TomlConfig::from_file(&path)?;
            tracing::info!("📄 Loaded configuration overrides from {}", path.display());
            self.apply(file);
        }
        Ok(self)
    }

    pub fn apply(&mut self, file: TomlConfig) {
        if let Some(server) = file.server {
            if let Some(port) = server.port {
                self.port = port;
            }
        }

        if let Some(auth) = file.auth {
            if auth.jwt_secret.is_some() {
                self.jwt_secret = auth.jwt_secret;
            }
            if let Some(username) = auth.login_username {
                self.login_username = username;
            }
            if let Some(password) = auth.login_password {
                self.login_password = password;
            }
        }

        if let Some(relay) = file.relay {
            if let Some(url) = relay.node_api_url {
                self.node_api_url = url;
            }
            if let Some(username) = relay.username {
                self.node_api_username = username;
            }
            if let Some(password) = relay.password {
                self.node_api_password = password;
            }
            if let Some(timeout) = relay.timeout_seconds {
                self.relay_timeout_secs = timeout;
            }
            if let Some(ttl) = relay.token_cache_ttl_seconds {
                self.token_cache_ttl_secs = ttl;
            }
        }
    }
}

impl ConfigProvider for CliConfig {
    fn node_api_url(&self) -> &str {
        &self.node_api_url
    }

    fn service_account(&self) -> Credentials {
        Credentials {
            username: self.node_api_username.clone(),
            password: self.node_api_password.clone(),
        }
    }

    fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }

    fn token_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.token_cache_ttl_secs)
    }

    fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or_default()
    }

    fn login_account(&self) -> Credentials {
        Credentials {
            username: self.login_username.clone(),
            password: self.login_password.clone(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let secret = validate_required_field("jwt_secret", &self.jwt_secret)?;
        validate_non_empty_secret("jwt_secret", secret)?;
        validate_non_empty_string("login_username", &self.login_username)?;
        validate_non_empty_secret("login_password", &self.login_password)?;
        validate_url("node_api_url", &self.node_api_url)?;
        validate_non_empty_string("node_api_username", &self.node_api_username)?;
        validate_non_empty_secret("node_api_password", &self.node_api_password)?;
        validate_range("relay_timeout_secs", self.relay_timeout_secs, 1, 300)?;
        validate_range(
            "token_cache_ttl_secs",
            self.token_cache_ttl_secs,
            0,
            MAX_TOKEN_CACHE_TTL_SECS,
        )?;

        reject_unresolved("jwt_secret", secret)?;
        reject_unresolved("login_password", &self.login_password)?;
        reject_unresolved("node_api_url", &self.node_api_url)?;
        reject_unresolved("node_api_password", &self.node_api_password)?;

        Ok(())
    }
}

/// Settings for the downstream `statistics-service` binary.
#[derive(Clone, Parser)]
#[command(name = "statistics-service")]
#[command(about = "Computes matrix statistics for authenticated callers")]
pub struct StatisticsServiceConfig {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "LOGIN_USERNAME", default_value = "admin")]
    pub login_username: String,

    #[arg(long, env = "LOGIN_PASSWORD", default_value = "password", hide_env_values = true)]
    pub login_password: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "JSON_LOGS", help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl std::fmt::Debug for StatisticsServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsServiceConfig")
            .field("port", &self.port)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("login_username", &self.login_username)
            .field("verbose", &self.verbose)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl StatisticsServiceConfig {
    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or_default()
    }

    pub fn login_account(&self) -> Credentials {
        Credentials {
            username: self.login_username.clone(),
            password: self.login_password.clone(),
        }
    }
}

impl Validate for StatisticsServiceConfig {
    fn validate(&self) -> Result<()> {
        let secret = validate_required_field("jwt_secret", &self.jwt_secret)?;
        validate_non_empty_secret("jwt_secret", secret)?;
        validate_non_empty_string("login_username", &self.login_username)?;
        validate_non_empty_secret("login_password", &self.login_password)?;
        Ok(())
    }
}

fn reject_unresolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(AppError::InvalidConfigValue {
            field: field_name.to_string(),
            value: "<redacted>".to_string(),
            reason: "Contains an unresolved ${VAR} placeholder".to_string(),
        });
    }
    Ok(())
}
