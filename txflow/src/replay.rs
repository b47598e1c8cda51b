//! # Signed Blob Replay
//!
//! Submits transactions that were signed earlier, typically by
//! [`SubmissionExecutor::sign_only`](crate::executor::SubmissionExecutor::sign_only)
//! on another machine. Each file holds one [`SignedBlob`], byte for byte as
//! it will be submitted.
//!
//! Replay does not look inside the blob. If its validity window has passed
//! the network rejects it; that is the caller's risk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ExecutorConfig;
use crate::error::{Result, TxFlowError};
use crate::executor::submit_and_confirm;
use crate::network::{ConfirmationResult, NetworkClient};
use crate::transaction::group::ensure_group_size;
use crate::transaction::signing::SignedBlob;

/// Source of previously signed blobs.
#[async_trait]
pub trait BlobLoader: Send + Sync {
    /// `Ok(None)` when nothing exists at `path`.
    async fn load_signed_blob(&self, path: &Path) -> Result<Option<SignedBlob>>;
}

/// Loads blobs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBlobLoader;

#[async_trait]
impl BlobLoader for FsBlobLoader {
    async fn load_signed_blob(&self, path: &Path) -> Result<Option<SignedBlob>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(SignedBlob::from_bytes(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes `blob` to `path`, replacing any existing file.
pub async fn write_signed_blob(path: impl AsRef<Path>, blob: &SignedBlob) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, blob.as_bytes()).await?;
    debug!(path = %path.display(), bytes = blob.len(), "wrote signed blob");
    Ok(())
}

/// Submits stored blobs and waits for confirmation.
pub struct SignedBlobReplayer<C: ?Sized, L = FsBlobLoader> {
    client: Arc<C>,
    loader: L,
    config: ExecutorConfig,
}

impl<C: NetworkClient + ?Sized> SignedBlobReplayer<C, FsBlobLoader> {
    /// Replayer reading from the local filesystem.
    pub fn new(client: Arc<C>, config: ExecutorConfig) -> Self {
        Self::with_loader(client, FsBlobLoader, config)
    }
}

impl<C: NetworkClient + ?Sized, L: BlobLoader> SignedBlobReplayer<C, L> {
    pub fn with_loader(client: Arc<C>, loader: L, config: ExecutorConfig) -> Self {
        Self {
            client,
            loader,
            config,
        }
    }

    /// Loads the blob at `path`, submits it unchanged and waits.
    ///
    /// # Errors
    ///
    /// [`TxFlowError::FileNotFound`] if the loader finds nothing at `path`;
    /// otherwise the same errors as a normal submission.
    pub async fn replay(&self, path: impl AsRef<Path>) -> Result<ConfirmationResult> {
        let blob = self.load(path.as_ref()).await?;
        submit_and_confirm(self.client.as_ref(), &self.config, &[blob]).await
    }

    /// Replays the members of a previously signed atomic group, one file
    /// per member, in the given order. All files are loaded before anything
    /// is submitted.
    pub async fn replay_group<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ConfirmationResult> {
        if paths.is_empty() {
            return Err(TxFlowError::InvalidTransaction("nothing to replay".into()));
        }
        ensure_group_size(paths.len())?;

        let mut blobs = Vec::with_capacity(paths.len());
        for path in paths {
            blobs.push(self.load(path.as_ref()).await?);
        }
        submit_and_confirm(self.client.as_ref(), &self.config, &blobs).await
    }

    async fn load(&self, path: &Path) -> Result<SignedBlob> {
        let blob = self
            .loader
            .load_signed_blob(path)
            .await?
            .ok_or_else(|| TxFlowError::FileNotFound(PathBuf::from(path)))?;
        info!(path = %path.display(), bytes = blob.len(), "replaying signed blob");
        Ok(blob)
    }
}
