use crate::utils::error::{AppError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 選用的 TOML 設定檔；每個欄位都是選填，只覆蓋有寫的部分
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub server: Option<ServerSection>,
    pub auth: Option<AuthSection>,
    pub relay: Option<RelaySection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    pub jwt_secret: Option<String>,
    pub login_username: Option<String>,
    pub login_password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    pub node_api_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub token_cache_ttl_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NODE_API_PASSWORD})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::Config {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
port = 9090

[auth]
jwt_secret = "file-secret"
login_username = "operator"

[relay]
node_api_url = "http://stats.internal:3000"
username = "relay-svc"
password = "relay-pass"
timeout_seconds = 15
token_cache_ttl_seconds = 600
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let relay = config.relay.unwrap();

        assert_eq!(config.server.unwrap().port, Some(9090));
        assert_eq!(config.auth.unwrap().login_password, None);
        assert_eq!(relay.node_api_url.as_deref(), Some("http://stats.internal:3000"));
        assert_eq!(relay.timeout_seconds, Some(15));
        assert_eq!(relay.token_cache_ttl_seconds, Some(600));
    }

    #[test]
    fn test_empty_file_is_valid() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.server.is_none());
        assert!(config.auth.is_none());
        assert!(config.relay.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MATRIX_RELAY_TEST_PASSWORD", "from-env");

        let toml_content = r#"
[relay]
password = "${MATRIX_RELAY_TEST_PASSWORD}"
username = "${MATRIX_RELAY_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let relay = config.relay.unwrap();
        assert_eq!(relay.password.as_deref(), Some("from-env"));
        assert_eq!(relay.username.as_deref(), Some("${MATRIX_RELAY_TEST_UNSET_VAR}"));

        std::env::remove_var("MATRIX_RELAY_TEST_PASSWORD");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let toml_content = r#"
[relay]
node_api_uri = "http://typo"
"#;

        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 8181\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.unwrap().port, Some(8181));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            TomlConfig::from_file("/definitely/not/here.toml"),
            Err(AppError::Io(_))
        ));
    }
}
