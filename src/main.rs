use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campaign_budget_api::{api, bootstrap, config::Config};

/// Main entry point for the application.
///
/// Initializes logging, loads configuration and the objective catalog, then
/// serves the estimation API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_budget_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = bootstrap::load_catalog_or_builtin(&config).await;
    tracing::info!(
        "Objective catalog ready: {}",
        catalog.names().join(", ")
    );

    let port = config.port;
    let state = bootstrap::build_state(config, catalog)?;
    let app = api::router(state)?;

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
