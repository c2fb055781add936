// src/store/gcs.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_cloud_storage::{
    client::{Client, ClientConfig},
    http::objects::upload::{Media, UploadObjectRequest, UploadType},
};
use tracing::debug;

use super::BlobStore;

/// Google Cloud Storage bucket, authenticated with application default credentials.
pub struct GcsStore {
    client: Client,
    bucket: String,
}

impl GcsStore {
    pub async fn new(bucket: impl Into<String>) -> Result<Self> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .context("initializing GCS client config")?;
        Ok(Self {
            client: Client::new(config),
            bucket: bucket.into(),
        })
    }
}

#[async_trait]
impl BlobStore for GcsStore {
    fn location(&self, name: &str) -> String {
        format!("gs://{}/{}", self.bucket, name)
    }

    async fn put(&self, name: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let mut media = Media::new(name.to_string());
        media.content_type = content_type.to_string().into();
        media.content_length = Some(body.len() as u64);
        let upload_type = UploadType::Simple(media);
        let request = UploadObjectRequest {
            bucket: self.bucket.clone(),
            ..Default::default()
        };

        let object = self
            .client
            .upload_object(&request, body, &upload_type)
            .await
            .with_context(|| format!("Failed to upload {} to GCS bucket {}", name, self.bucket))?;
        debug!(object = %object.name, generation = object.generation, "stored object");
        Ok(())
    }
}
