use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Asynchronous byte source the load pipeline reads encrypted model blobs
/// (and external bone-group tables) through.
pub trait AssetReader: Send + Sync {
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Reader resolving uris against a root directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root: PathBuf,
}

impl FileAssetReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(self.root.join(uri)).await?)
    }
}
