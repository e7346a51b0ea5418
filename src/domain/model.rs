use serde::{Deserialize, Serialize};

/// Rows of columns. Shape is only guaranteed after `matrix::is_valid`.
pub type Matrix = Vec<Vec<i64>>;

/// Opaque statistics document returned by the downstream service.
/// Key order is preserved as received.
pub type StatisticsResult = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateRequest {
    pub data: Matrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateResponse {
    pub rotated_matrix: Matrix,
    pub statistics: StatisticsResult,
}

/// Body sent to `POST /api/statistics` downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayPayload {
    pub data: Matrix,
    #[serde(default)]
    pub original_diagonal: Option<bool>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: String,
}

/// Identity attached to a request once its bearer token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}
