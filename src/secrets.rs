// src/secrets.rs

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigError;

pub const APP_ID_SECRET: &str = "jmap-app-id";
pub const BUCKET_SECRET: &str = "jmap-gcs-bucket-name";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const SECRET_MANAGER_URL: &str = "https://secretmanager.googleapis.com/v1";

/// Resolves named secrets at startup.
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn secret(&self, id: &str) -> Result<String, ConfigError>;
}

/// Environment variable holding a secret locally: `jmap-app-id` → `JMAP_APP_ID`.
pub fn env_name(secret_id: &str) -> String {
    secret_id.to_ascii_uppercase().replace('-', "_")
}

/// Reads secrets from environment variables named by [`env_name`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

#[async_trait]
impl SecretSource for EnvSecrets {
    async fn secret(&self, id: &str) -> Result<String, ConfigError> {
        let name = env_name(id);
        std::env::var(&name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::Secret {
                secret: id.to_string(),
                reason: format!("{} is not set", name),
            })
    }
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Deserialize)]
struct AccessSecretVersion {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: String,
}

/// Google Secret Manager over REST, authenticated through the metadata server.
pub struct SecretManagerSecrets {
    client: Client,
    project: String,
    version: String,
}

impl SecretManagerSecrets {
    pub fn new(client: Client, project: impl Into<String>) -> Self {
        Self {
            client,
            project: project.into(),
            version: "latest".to_string(),
        }
    }

    fn version_url(&self, id: &str) -> String {
        format!(
            "{}/projects/{}/secrets/{}/versions/{}:access",
            SECRET_MANAGER_URL, self.project, id, self.version
        )
    }

    async fn access_token(&self) -> Result<String> {
        let token: AccessToken = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .context("requesting metadata server token")?
            .error_for_status()
            .context("metadata server refused token")?
            .json()
            .await
            .context("decoding metadata token")?;
        Ok(token.access_token)
    }

    async fn access(&self, id: &str) -> Result<String> {
        let token = self.access_token().await?;
        let url = self.version_url(id);
        debug!(%url, "accessing secret version");
        let version: AccessSecretVersion = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .json()
            .await
            .context("decoding secret version")?;
        decode_payload(&version.payload.data)
    }
}

fn decode_payload(data: &str) -> Result<String> {
    let bytes = STANDARD.decode(data).context("secret payload is not base64")?;
    let value = String::from_utf8(bytes).context("secret payload is not UTF-8")?;
    if value.trim().is_empty() {
        return Err(anyhow!("secret payload is empty"));
    }
    Ok(value)
}

#[async_trait]
impl SecretSource for SecretManagerSecrets {
    async fn secret(&self, id: &str) -> Result<String, ConfigError> {
        self.access(id).await.map_err(|e| ConfigError::Secret {
            secret: id.to_string(),
            reason: format!("{:#}", e),
        })
    }
}

/// Env overrides when both secrets are present locally, Secret Manager otherwise.
pub fn default_source(
    client: Client,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn SecretSource>, ConfigError> {
    let local = [APP_ID_SECRET, BUCKET_SECRET]
        .iter()
        .all(|id| lookup(&env_name(id)).is_some_and(|v| !v.trim().is_empty()));
    if local {
        info!("using secrets from environment");
        return Ok(Box::new(EnvSecrets));
    }

    let project = lookup("GCP_PROJECT")
        .filter(|p| !p.trim().is_empty())
        .ok_or(ConfigError::Missing("GCP_PROJECT"))?;
    info!(%project, "using Secret Manager");
    Ok(Box::new(SecretManagerSecrets::new(client, project)))
}
