// src/fetch/estat.rs

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::years::time_code;
use crate::config::Config;
use crate::error::FetchError;

/// Unparsed response text for one survey year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawYearPayload {
    pub year: i32,
    pub body: String,
}

/// Anything that can hand back the raw statistics text for a census year.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_year(&self, year: i32) -> Result<RawYearPayload, FetchError>;
}

/// `getSimpleStatsData` client for the e-Stat REST API.
pub struct EstatClient {
    client: Client,
    base_url: Url,
    app_id: String,
    stats_data_id: String,
}

impl EstatClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.estat_base_url.clone(),
            app_id: config.app_id.clone(),
            stats_data_id: config.stats_data_id.clone(),
        }
    }

    fn query(&self, year: i32) -> [(&'static str, String); 6] {
        [
            ("appId", self.app_id.clone()),
            ("statsDataId", self.stats_data_id.clone()),
            ("cdTime", time_code(year)),
            ("metaGetFlg", "Y".to_string()),
            ("cntGetFlg", "N".to_string()),
            ("sectionHeaderFlg", "1".to_string()),
        ]
    }
}

#[async_trait]
impl StatsSource for EstatClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_year(&self, year: i32) -> Result<RawYearPayload, FetchError> {
        debug!(url = %self.base_url, "requesting simple stats data");
        let resp = self
            .client
            .get(self.base_url.clone())
            .query(&self.query(year))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        debug!(bytes = body.len(), "received payload");
        Ok(RawYearPayload { year, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> Config {
        Config {
            app_id: "abcd1234".into(),
            bucket: "bucket".into(),
            port: 8080,
            estat_base_url: Url::parse("https://example.invalid/getSimpleStatsData").unwrap(),
            stats_data_id: "0000010101".into(),
            request_timeout: Duration::from_secs(5),
            fetch_concurrency: 1,
        }
    }

    #[test]
    fn test_query_parameters() {
        let client = EstatClient::new(Client::new(), &config());
        let query = client.query(2015);
        assert_eq!(query[0], ("appId", "abcd1234".to_string()));
        assert_eq!(query[1], ("statsDataId", "0000010101".to_string()));
        assert_eq!(query[2], ("cdTime", "2015100000".to_string()));
        assert_eq!(query[3], ("metaGetFlg", "Y".to_string()));
        assert_eq!(query[4], ("cntGetFlg", "N".to_string()));
        assert_eq!(query[5], ("sectionHeaderFlg", "1".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let mut cfg = config();
        cfg.estat_base_url = Url::parse("http://127.0.0.1:9/getSimpleStatsData").unwrap();
        let client = EstatClient::new(
            Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap(),
            &cfg,
        );
        let err = client.fetch_year(2020).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
