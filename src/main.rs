use anyhow::{Context, Result};
use jmap_population::{
    config::Config,
    fetch::{EstatClient, SystemClock},
    logging, secrets,
    server::{self, AppState},
    store::GcsStore,
};
use reqwest::Client;
use std::{env, sync::Arc, time::Duration};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) env + logging ────────────────────────────────────────────
    let _ = dotenvy::dotenv();
    logging::init();
    info!("Starting population renew service");

    // ─── 2) resolve secrets; refuse to serve without them ────────────
    let secret_client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("building secret client")?;
    let secret_source = secrets::default_source(secret_client, |key| env::var(key).ok())
        .context("choosing secret source")?;
    let config = Config::from_env(secret_source.as_ref())
        .await
        .context("Could not retrieve secrets. Please check configuration and permissions.")?;
    info!(
        app_id = %config.app_id_hint(),
        bucket = %config.bucket,
        stats_data_id = %config.stats_data_id,
        "configuration loaded"
    );

    // ─── 3) collaborators ────────────────────────────────────────────
    let http = Client::builder()
        .timeout(config.request_timeout)
        .gzip(true)
        .build()
        .context("building e-Stat client")?;
    let store = GcsStore::new(config.bucket.clone()).await?;

    let state = AppState {
        source: Arc::new(EstatClient::new(http, &config)),
        store: Arc::new(store),
        clock: Arc::new(SystemClock),
        fetch_concurrency: config.fetch_concurrency,
    };

    // ─── 4) serve ────────────────────────────────────────────────────
    info!("Server starting on port {}", config.port);
    info!("Health check: http://localhost:{}/health", config.port);
    info!("Renew endpoint: POST http://localhost:{}/api/v1/renew", config.port);

    warp::serve(server::routes(state))
        .run(([0, 0, 0, 0], config.port))
        .await;

    Ok(())
}
