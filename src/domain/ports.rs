use crate::domain::model::{Matrix, StatisticsResult};
use crate::utils::error::RelayError;
use async_trait::async_trait;
use std::time::Duration;

/// Identity/secret pair: the accepted login account, or the relay's
/// service account in the downstream namespace.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn node_api_url(&self) -> &str;
    fn service_account(&self) -> Credentials;
    fn relay_timeout(&self) -> Duration;
    fn token_cache_ttl(&self) -> Duration;
    fn jwt_secret(&self) -> &str;
    fn login_account(&self) -> Credentials;
}

/// Downstream statistics service: login-then-call, one attempt per call.
#[async_trait]
pub trait StatisticsRelay: Send + Sync {
    async fn authenticate(&self, identity: &str, secret: &str) -> Result<String, RelayError>;

    async fn send_statistics(
        &self,
        rotated: &Matrix,
        original_diagonal: bool,
        token: &str,
    ) -> Result<StatisticsResult, RelayError>;
}
