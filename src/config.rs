// src/config.rs

use std::{str::FromStr, time::Duration};
use url::Url;

use crate::error::ConfigError;
use crate::secrets::{SecretSource, APP_ID_SECRET, BUCKET_SECRET};

pub const DEFAULT_BASE_URL: &str = "https://api.e-stat.go.jp/rest/3.0/app/getSimpleStatsData";
pub const DEFAULT_STATS_DATA_ID: &str = "0000010101";

/// Everything the service needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_id: String,
    pub bucket: String,
    pub port: u16,
    pub estat_base_url: Url,
    pub stats_data_id: String,
    pub request_timeout: Duration,
    pub fetch_concurrency: usize,
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

impl Config {
    /// Read settings through `lookup`, then pull the two secrets.
    pub async fn load(
        secrets: &dyn SecretSource,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let timeout_secs = parse_or(&lookup, "ESTAT_TIMEOUT_SECS", 30u64)?;
        let fetch_concurrency = parse_or(&lookup, "ESTAT_FETCH_CONCURRENCY", 1usize)?.max(1);
        let raw_url = lookup("ESTAT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let estat_base_url = Url::parse(&raw_url).map_err(|_| ConfigError::Invalid {
            name: "ESTAT_BASE_URL",
            value: raw_url.clone(),
        })?;
        let stats_data_id =
            lookup("ESTAT_STATS_DATA_ID").unwrap_or_else(|| DEFAULT_STATS_DATA_ID.to_string());

        let app_id = secrets.secret(APP_ID_SECRET).await?;
        let bucket = secrets.secret(BUCKET_SECRET).await?;

        Ok(Self {
            app_id: app_id.trim().to_string(),
            bucket: bucket.trim().to_string(),
            port,
            estat_base_url,
            stats_data_id,
            request_timeout: Duration::from_secs(timeout_secs),
            fetch_concurrency,
        })
    }

    /// `load` against the process environment.
    pub async fn from_env(secrets: &dyn SecretSource) -> Result<Self, ConfigError> {
        Self::load(secrets, |key| std::env::var(key).ok()).await
    }

    /// First four characters of the credential, for logs.
    pub fn app_id_hint(&self) -> String {
        let head: String = self.app_id.chars().take(4).collect();
        format!("{}...", head)
    }
}
