mod server;
mod setup;

use anyhow::Context;
use cinemateca_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinemateca=info".into()),
        )
        .init();

    // Load and validate configuration before connecting anything
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let app = setup::initialize_app(&config).await?;

    server::start_server(&config, app.router()).await?;

    app.shutdown().await;

    Ok(())
}
