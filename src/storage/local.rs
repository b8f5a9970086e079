//! Local filesystem storage
//!
//! Writes download bodies to the crawl's download directory as they
//! stream in. A failed write removes the partial file and surfaces the
//! error; the caller decides whether the crawl continues.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::fetch::BodyStream;
use crate::Result;

/// Download directory sink
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Creates the store, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Full path for a derived filename.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Returns true when a file with this name is already present.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Streams a download body into the named file.
    ///
    /// Returns the path written. On error the partial file is removed.
    pub async fn save(&self, name: &str, mut body: BodyStream) -> Result<PathBuf> {
        let path = self.path(name);

        match self.write_stream(&path, &mut body).await {
            Ok(()) => Ok(path),
            Err(e) => {
                let _ = tokio::fs::remove_file(&path).await;
                Err(e)
            }
        }
    }

    async fn write_stream(&self, path: &Path, body: &mut BodyStream) -> Result<()> {
        let mut file = tokio::fs::File::create(path).await?;

        while let Some(chunk) = body.next().await {
            file.write_all(&chunk?).await?;
        }

        file.flush().await?;
        Ok(())
    }
}
