//! # Submission Executor
//!
//! Turns one [`ExecParams`] or an ordered batch of them into a confirmed
//! transaction (or atomic group):
//!
//! ```text
//! size check ─► fetch params ─► build ─► group? ─► sign ─► submit ─► wait
//!  (no I/O)      (once)         (each)   (n > 1)   (each)   (once)   (bounded)
//! ```
//!
//! Every step before submission is local and fallible, so a bad entry
//! anywhere in a batch fails the whole call before anything is broadcast.
//! There is no partial submission and nothing is retried.
//!
//! ## Cancellation
//!
//! Dropping the future returned by [`SubmissionExecutor::execute`] after the
//! submit call has gone out stops the confirmation wait but does **not**
//! retract the transactions: the network may still confirm them. Callers
//! that cancel should look the transaction id up later.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ExecutorConfig;
use crate::error::{Result, TxFlowError};
use crate::network::{wait_for_confirmation, ConfirmationResult, NetworkClient};
use crate::transaction::builder::build_transaction;
use crate::transaction::exec::ExecParams;
use crate::transaction::group::{assign_group_id, ensure_group_size};
use crate::transaction::params::resolve;
use crate::transaction::signing::{sign_transaction, SignedBlob};

/// What to execute: one transaction, or an ordered atomic group.
///
/// A `Group` with a single entry is submitted as a plain transaction with no
/// group id.
#[derive(Debug, Clone)]
pub enum ExecRequest {
    Single(ExecParams),
    Group(Vec<ExecParams>),
}

impl ExecRequest {
    pub fn entries(&self) -> &[ExecParams] {
        match self {
            Self::Single(exec) => std::slice::from_ref(exec),
            Self::Group(execs) => execs,
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl From<ExecParams> for ExecRequest {
    fn from(exec: ExecParams) -> Self {
        Self::Single(exec)
    }
}

impl From<Vec<ExecParams>> for ExecRequest {
    fn from(execs: Vec<ExecParams>) -> Self {
        Self::Group(execs)
    }
}

/// Builds, signs, submits and confirms transactions against a
/// [`NetworkClient`].
///
/// Holds no mutable state; share it freely across tasks.
pub struct SubmissionExecutor<C: ?Sized> {
    client: Arc<C>,
    config: ExecutorConfig,
}

impl<C: ?Sized> Clone for SubmissionExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: self.config.clone(),
        }
    }
}

impl<C: NetworkClient + ?Sized> SubmissionExecutor<C> {
    pub fn new(client: Arc<C>, config: ExecutorConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs the full pipeline and returns the confirmation of the first
    /// transaction.
    ///
    /// # Errors
    ///
    /// - [`TxFlowError::GroupSizeExceeded`] before any network call when the
    ///   request has more than 16 entries.
    /// - [`TxFlowError::StaleNetwork`] when the network reports round 0.
    /// - Any build or signing error, before anything is submitted.
    /// - [`TxFlowError::Network`], [`TxFlowError::Rejected`] or
    ///   [`TxFlowError::ConfirmationTimeout`] after submission.
    pub async fn execute(&self, request: ExecRequest) -> Result<ConfirmationResult> {
        let result = async {
            let blobs = self.prepare(request.entries()).await?;
            submit_and_confirm(self.client.as_ref(), &self.config, &blobs).await
        }
        .await;

        if let Err(e) = &result {
            warn!(error = %e, entries = request.len(), "execution failed");
        }
        result
    }

    pub async fn execute_one(&self, exec: ExecParams) -> Result<ConfirmationResult> {
        self.execute(ExecRequest::Single(exec)).await
    }

    pub async fn execute_group(&self, execs: Vec<ExecParams>) -> Result<ConfirmationResult> {
        self.execute(ExecRequest::Group(execs)).await
    }

    /// Everything up to and including signing, without submitting. The
    /// blobs can be written to disk and replayed later.
    pub async fn sign_only(&self, request: ExecRequest) -> Result<Vec<SignedBlob>> {
        self.prepare(request.entries()).await
    }

    async fn prepare(&self, entries: &[ExecParams]) -> Result<Vec<SignedBlob>> {
        if entries.is_empty() {
            return Err(TxFlowError::InvalidTransaction(
                "nothing to execute".into(),
            ));
        }
        ensure_group_size(entries.len())?;

        debug!(state = "building", entries = entries.len());
        let raw = self.client.suggested_params().await?;

        let txns = entries
            .iter()
            .map(|exec| {
                let params = resolve(&raw, &exec.pay_flags)?;
                build_transaction(exec, &params)
            })
            .collect::<Result<Vec<_>>>()?;

        let txns = if txns.len() > 1 {
            let grouped = assign_group_id(txns)?;
            debug!(state = "grouped", members = grouped.len());
            grouped
        } else {
            txns
        };

        let blobs = txns
            .into_iter()
            .zip(entries)
            .map(|(txn, exec)| sign_transaction(txn, exec))
            .collect::<Result<Vec<_>>>()?;

        debug!(state = "signed", blobs = blobs.len());
        Ok(blobs)
    }
}

/// Submits `blobs` in one call, then waits for the first transaction.
///
/// The round-based wait is additionally capped by
/// `config.confirmation_timeout`.
pub(crate) async fn submit_and_confirm<C>(
    client: &C,
    config: &ExecutorConfig,
    blobs: &[SignedBlob],
) -> Result<ConfirmationResult>
where
    C: NetworkClient + ?Sized,
{
    let txid = client.submit_raw(blobs).await?;
    info!(txid = %txid, blobs = blobs.len(), state = "submitted", "submitted transactions");

    match tokio::time::timeout(
        config.confirmation_timeout,
        wait_for_confirmation(client, &txid, config.wait_rounds),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(TxFlowError::ConfirmationTimeout {
            txid: txid.to_string(),
            rounds: config.wait_rounds,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
