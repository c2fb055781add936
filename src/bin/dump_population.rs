// src/bin/dump_population.rs
// Run the renew pipeline once and write the JSON document locally.
//
// Usage: dump_population [output-dir]
// Credentials come from JMAP_APP_ID (or Secret Manager via GCP_PROJECT).

use anyhow::{Context, Result};
use jmap_population::{
    config::Config,
    fetch::{Clock, EstatClient, SystemClock},
    logging, pipeline, secrets,
    store::{self, FileStore},
};
use reqwest::Client;
use std::{env, time::Instant};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();

    let out_dir = env::args().nth(1).unwrap_or_else(|| "out".to_string());

    let client = Client::new();
    let secret_source = secrets::default_source(client.clone(), |key| env::var(key).ok())?;
    let config = Config::from_env(secret_source.as_ref())
        .await
        .context("resolving configuration")?;
    info!(app_id = %config.app_id_hint(), "fetching with credential");

    let http = Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("building e-Stat client")?;
    let source = EstatClient::new(http, &config);

    let start = Instant::now();
    let result = pipeline::run(&source, SystemClock.today(), config.fetch_concurrency).await?;

    let location = store::save(&FileStore::new(&out_dir), &result).await?;
    info!(%location, elapsed = ?start.elapsed(), years = result.years().count(), "wrote population data");
    println!("{}", location);
    Ok(())
}
