use crate::adapters::{DownstreamTokenCache, RelayClient};
use crate::core::pipeline::MatrixPipeline;
use crate::core::token::TokenService;
use crate::core::{ConfigProvider, Credentials};
use crate::utils::error::Result;
use axum::extract::FromRef;
use std::sync::Arc;

/// Token issuing and the single accepted login account. Shared by both services.
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
    pub login: Arc<Credentials>,
}

impl AuthState {
    pub fn new(secret: &str, login: Credentials) -> Self {
        Self {
            tokens: Arc::new(TokenService::new(secret.as_bytes())),
            login: Arc::new(login),
        }
    }
}

/// State for the relay service.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub pipeline: Arc<MatrixPipeline<RelayClient>>,
}

impl AppState {
    pub fn new(auth: AuthState, pipeline: MatrixPipeline<RelayClient>) -> Self {
        Self {
            auth,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let auth = AuthState::new(config.jwt_secret(), config.login_account());
        let relay = RelayClient::from_config(config)?;
        let pipeline = MatrixPipeline::new(relay, config.service_account())
            .with_token_cache(DownstreamTokenCache::new(config.token_cache_ttl()));

        Ok(Self::new(auth, pipeline))
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// State for the downstream statistics service.
#[derive(Clone)]
pub struct StatisticsState {
    pub auth: AuthState,
}

impl FromRef<StatisticsState> for AuthState {
    fn from_ref(state: &StatisticsState) -> Self {
        state.auth.clone()
    }
}
