pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{DownstreamTokenCache, RelayClient};
pub use app::{create_router, create_statistics_router, AppState, AuthState, StatisticsState};
pub use config::{CliConfig, StatisticsServiceConfig};
pub use core::{pipeline::MatrixPipeline, token::TokenService};
pub use utils::error::{AppError, RelayError, Result, TokenError};
