pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod pipeline;
pub mod specialists;
pub mod store;
pub mod voice;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Start the service and block until Ctrl-C.
pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = config::AppConfig::from_env();
    if app_config.completion.api_key.is_none() {
        tracing::warn!("COMPLETION_API_KEY not set; completion requests will be unauthenticated");
    }

    let bind_addr = app_config.bind_addr;
    let core = core_state::CoreState::from_config(app_config).map_err(|e| e.to_string())?;
    let mut server = api::start_server(Arc::new(core), bind_addr).await?;

    tracing::info!(addr = %server.info.server_addr, "Ready");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for shutdown signal: {e}"))?;

    server.shutdown();
    Ok(())
}
