use anyhow::Result;
use storefront::StorefrontConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ax = storefront::build().await?;
    let config = StorefrontConfig::from_snapshot(&ax.app.config_snapshot());

    tracing::info!(addr = %config.addr(), seeded = config.seed_on_start, "machines & more storefront");

    ax.listen(config.addr()).await?;

    Ok(())
}
