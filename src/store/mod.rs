// src/store/mod.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::process::PopulationResult;

pub mod gcs;
pub mod local;

pub use gcs::GcsStore;
pub use local::{FileStore, MemoryStore};

/// Object the assembled result is written to.
pub const OBJECT_NAME: &str = "population_by_year_prefecture.json";

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A flat namespace of overwritable blobs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Human-readable address of `name`, e.g. `gs://bucket/name`.
    fn location(&self, name: &str) -> String;

    async fn put(&self, name: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// Pretty JSON with 2-space indent; non-ASCII written as-is.
pub fn to_json(result: &PopulationResult) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(result)
}

/// Serialize `result` and write it to [`OBJECT_NAME`]. Returns the location.
pub async fn save(store: &dyn BlobStore, result: &PopulationResult) -> Result<String> {
    let body = to_json(result).context("serializing population result")?;
    let location = store.location(OBJECT_NAME);
    info!(%location, bytes = body.len(), "uploading population result");
    store.put(OBJECT_NAME, body, JSON_CONTENT_TYPE).await?;
    info!(%location, "upload complete");
    Ok(location)
}
