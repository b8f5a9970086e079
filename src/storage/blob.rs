//! Remote blob mirroring
//!
//! Mirrors downloaded files to an S3-compatible object-storage
//! container. Credentials and region come from the standard environment
//! provider chain, never from flags. An upload is skipped when the
//! remote copy's last-modified time is not older than the local file's
//! modification time; the comparison uses calendar time, not content.

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};

use crate::{Result, SiteripError};

/// Remote object-storage mirror for the download directory
pub struct BlobMirror {
    client: Client,
    container: String,
}

impl BlobMirror {
    /// Connects to the remote store and ensures the container exists.
    ///
    /// Called before traversal starts; any failure here is fatal to the
    /// run. The container is created when absent, as a convenience for
    /// first runs.
    pub async fn connect(container: &str) -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let mirror = Self {
            client,
            container: container.to_string(),
        };
        mirror.ensure_container().await?;
        Ok(mirror)
    }

    async fn ensure_container(&self) -> Result<()> {
        let head = self
            .client
            .head_bucket()
            .bucket(&self.container)
            .send()
            .await;

        if head.is_ok() {
            return Ok(());
        }

        self.client
            .create_bucket()
            .bucket(&self.container)
            .send()
            .await
            .map_err(|e| {
                SiteripError::Remote(format!(
                    "container '{}' is not accessible and could not be created: {}",
                    self.container, e
                ))
            })?;

        tracing::info!("Created container: {}", self.container);
        Ok(())
    }

    /// Last-modified time of the remote copy, or None when it does not
    /// exist or cannot be read; either way the upload proceeds.
    async fn remote_modified(&self, key: &str) -> Option<DateTime<Utc>> {
        let head = self
            .client
            .head_object()
            .bucket(&self.container)
            .key(key)
            .send()
            .await
            .ok()?;

        let modified = head.last_modified()?;
        DateTime::from_timestamp(modified.secs(), modified.subsec_nanos())
    }

    /// Mirrors a local file to the container under its filename.
    ///
    /// Returns true when an upload happened, false when the remote copy
    /// was already current.
    pub async fn mirror(&self, path: &Path) -> Result<bool> {
        let key = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SiteripError::Remote(format!("unusable path: {}", path.display())))?;

        let local_modified: DateTime<Utc> = tokio::fs::metadata(path).await?.modified()?.into();

        let remote = self.remote_modified(key).await;
        if !needs_upload(local_modified, remote) {
            tracing::info!("Skipping upload for {}, remote copy is current", key);
            return Ok(false);
        }

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| SiteripError::Remote(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.container)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| SiteripError::Remote(e.to_string()))?;

        tracing::info!("Uploaded {} to container '{}'", key, self.container);
        Ok(true)
    }
}

/// Freshness rule for mirroring: upload when there is no remote copy, or
/// when the local file is strictly newer than it.
pub fn needs_upload(local_modified: DateTime<Utc>, remote_modified: Option<DateTime<Utc>>) -> bool {
    match remote_modified {
        None => true,
        Some(remote) => local_modified > remote,
    }
}
