//! Image storage backends for unlisted item pictures

use crate::core::service::ImageStorage;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Images kept in a map keyed by path
#[derive(Clone, Default)]
pub struct InMemoryImageStorage {
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.images
            .read()
            .map(|images| images.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.images.read().map(|images| images.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStorage for InMemoryImageStorage {
    async fn store(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        _content_type: Option<&str>,
    ) -> Result<String> {
        let path = format!("images/{}", stored_name(filename));
        let mut images = self
            .images
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        images.insert(path.clone(), bytes);
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut images = self
            .images
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        images
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| anyhow!("Image '{}' not found", path))
    }
}

/// Images written as files under a root directory
#[derive(Debug, Clone)]
pub struct FsImageStorage {
    root: PathBuf,
}

impl FsImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        if path.is_empty() || path.contains(['/', '\\']) || path.starts_with('.') {
            bail!("Invalid image path '{}'", path);
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl ImageStorage for FsImageStorage {
    async fn store(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        _content_type: Option<&str>,
    ) -> Result<String> {
        tokio::fs::create_dir_all(&self.root).await?;

        let name = stored_name(filename);
        tokio::fs::write(self.root.join(&name), bytes).await?;

        tracing::debug!(path = %name, "Stored image");
        Ok(name)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let file = self.resolve(path)?;
        tokio::fs::remove_file(file).await?;
        Ok(())
    }
}

/// Unique file name keeping only a safe extension of the upload name
fn stored_name(filename: &str) -> String {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}
