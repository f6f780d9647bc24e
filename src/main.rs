use household_bridge::middleware::{BridgeConfig, bridge_routes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "household_bridge=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Resolve the resource server before accepting any request
    let config = BridgeConfig::from_env()?;
    let app = bridge_routes(config)?;

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!(addr = %bind_addr, "household-bridge listening");
    axum::serve(listener, app).await?;

    Ok(())
}
