use anyhow::Context;
use clap::Parser;
use matrix_relay::app::server;
use matrix_relay::utils::{logger, validation::Validate};
use matrix_relay::{create_statistics_router, AuthState, StatisticsServiceConfig, StatisticsState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StatisticsServiceConfig::parse();

    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting statistics-service");
    if config.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let state = StatisticsState {
        auth: AuthState::new(config.jwt_secret(), config.login_account()),
    };

    server::serve(create_statistics_router(state), config.port, "statistics-service")
        .await
        .context("statistics-service server error")?;

    Ok(())
}
