use anyhow::Context;
use clap::Parser;
use matrix_relay::app::server;
use matrix_relay::core::ConfigProvider;
use matrix_relay::utils::{logger, validation::Validate};
use matrix_relay::{create_router, AppState, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.json_logs);

    tracing::info!("Starting matrix-relay");

    let config = match config.load_file_overrides() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration file: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    if config.token_cache_ttl().is_zero() {
        tracing::info!("Downstream token cache disabled; every request logs in downstream");
    } else {
        tracing::info!(
            "Downstream token cache enabled (ttl {:?})",
            config.token_cache_ttl()
        );
    }
    tracing::info!("📡 Relaying statistics to {}", config.node_api_url());

    let state = AppState::from_config(&config).context("failed to build application state")?;

    server::serve(create_router(state), config.port, "matrix-relay")
        .await
        .context("matrix-relay server error")?;

    Ok(())
}
