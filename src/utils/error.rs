use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// 簽發或驗證 token 時的錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// 下游統計服務呼叫失敗
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("downstream login failed with status {status}: {body}")]
    AuthFailed { status: u16, body: String },

    #[error("downstream login returned an empty token")]
    EmptyToken,

    #[error("downstream statistics call failed with status {status}: {body}")]
    RelayFailed { status: u16, body: String },

    #[error("could not decode downstream response: {0}")]
    DecodeError(String),

    #[error("downstream call timed out")]
    Timeout,

    #[error("downstream transport error: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::Timeout
        } else if err.is_decode() {
            RelayError::DecodeError(err.to_string())
        } else {
            RelayError::Transport(err)
        }
    }
}

impl RelayError {
    /// 下游是否拒絕了我們的 token（快取的 token 需要作廢）
    pub fn is_rejected_token(&self) -> bool {
        matches!(self, RelayError::RelayFailed { status: 401 | 403, .. })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authentication error: {0}")]
    Auth(#[from] TokenError),

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Upstream error: {0}")]
    Upstream(#[from] RelayError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing config value: {field}")]
    MissingConfig { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Auth,
    Upstream,
    Configuration,
    Internal,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Validation { .. } => ErrorCategory::Validation,
            AppError::Auth(TokenError::Signing(_)) => ErrorCategory::Internal,
            AppError::Auth(_) | AppError::Unauthorized { .. } | AppError::InvalidCredentials => {
                ErrorCategory::Auth
            }
            AppError::Upstream(_) => ErrorCategory::Upstream,
            AppError::Config { .. }
            | AppError::InvalidConfigValue { .. }
            | AppError::MissingConfig { .. } => ErrorCategory::Configuration,
            AppError::Io(_) | AppError::Internal { .. } => ErrorCategory::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Auth => StatusCode::UNAUTHORIZED,
            ErrorCategory::Upstream
            | ErrorCategory::Configuration
            | ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 回給呼叫端的訊息；上游與內部錯誤的細節只寫進日誌
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::Validation { message } => message.clone(),
            AppError::Auth(TokenError::Expired) => "Token expired".to_string(),
            AppError::Auth(TokenError::Signing(_)) => "Could not generate token".to_string(),
            AppError::Auth(_) => "Invalid or expired token".to_string(),
            AppError::Unauthorized { message } => message.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Upstream(_) => "Error processing matrix".to_string(),
            AppError::Config { .. }
            | AppError::InvalidConfigValue { .. }
            | AppError::MissingConfig { .. }
            | AppError::Io(_)
            | AppError::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.category() {
            ErrorCategory::Upstream | ErrorCategory::Internal | ErrorCategory::Configuration => {
                tracing::error!(category = ?self.category(), "❌ {}", self);
            }
            ErrorCategory::Auth => tracing::warn!("🔒 {}", self),
            ErrorCategory::Validation => tracing::debug!("{}", self),
        }

        (status, Json(json!({ "error": self.user_friendly_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
