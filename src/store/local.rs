// src/store/local.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::Mutex,
};
use tokio::fs;

use super::BlobStore;

/// Blobs as files under a directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for FileStore {
    fn location(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }

    async fn put(&self, name: &str, body: Vec<u8>, _content_type: &str) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating {}", self.root.display()))?;
        let path = self.root.join(name);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
        Ok(())
    }
}

/// In-process store keyed by object name.
pub struct MemoryStore {
    bucket: String,
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Content type and body of `name`, if written.
    pub fn get(&self, name: &str) -> Option<(String, Vec<u8>)> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(name).cloned())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    fn location(&self, name: &str) -> String {
        format!("mem://{}/{}", self.bucket, name)
    }

    async fn put(&self, name: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        objects.insert(name.to_string(), (content_type.to_string(), body));
        Ok(())
    }
}
