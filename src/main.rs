//! NextStore - self-hosted storefront backend

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nextstore::auth::{InMemoryTokens, TokenAuthority};
use nextstore::config::Config;
use nextstore::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let nats = match &config.nats_url {
        Some(url) => async_nats::connect(url).await.ok(),
        None => None,
    };
    let auth: Arc<dyn TokenAuthority> = Arc::new(InMemoryTokens::from_spec(&config.api_tokens)?);

    let state = AppState {
        db,
        nats,
        auth,
        enforce_coupon_expiry: config.enforce_coupon_expiry,
    };
    let app = router(state);

    tracing::info!("🚀 NextStore listening on 0.0.0.0:{}", config.port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?,
        app,
    )
    .await?;
    Ok(())
}
