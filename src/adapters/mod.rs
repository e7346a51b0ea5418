// Adapters layer: concrete implementations for external systems.

pub mod relay_client;
pub mod token_cache;

pub use relay_client::RelayClient;
pub use token_cache::DownstreamTokenCache;
