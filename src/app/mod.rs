// HTTP surface: routing, auth gate and handlers for both services.

pub mod auth_gate;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::{create_router, create_statistics_router};
pub use state::{AppState, AuthState, StatisticsState};
