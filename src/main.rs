use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use rex_recipes::{
    app::{AppState, router},
    config::Config,
    upstream::GatewayClient,
};

fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    if config.gateway_api_key.is_none() {
        warn!("AI_GATEWAY_API_KEY is not set; every generation request will fail");
    }

    let backend = GatewayClient::from_config(&config).context("failed to build gateway client")?;
    let bind_address = config.bind_address.clone();
    let state = AppState::new(config, Arc::new(backend));
    let app = router(state);

    let tcp_listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!("Recipe server started at http://{}/generate-recipe", bind_address);

    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
