//! # Network Module
//!
//! The crate never talks to a node directly. Everything network-bound goes
//! through the [`NetworkClient`] trait so hosts can plug in their own HTTP
//! client, and tests can use [`LocalLedger`].
//!
//! ## Architecture
//!
//! ```text
//! mod.rs           — NetworkClient trait and the values it exchanges
//! confirmation.rs  — bounded wait for a transaction to be confirmed
//! local.rs         — in-memory ledger implementing NetworkClient
//! ```

pub mod confirmation;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transaction::params::SuggestedParams;
use crate::transaction::signing::SignedBlob;
use crate::transaction::types::TxId;

pub use confirmation::wait_for_confirmation;
pub use local::{LocalLedger, LocalLedgerConfig};

/// Failures reported by a [`NetworkClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The request never got a usable answer (connection, timeout, 5xx).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The node refused the submission outright.
    #[error("submission rejected by node: {0}")]
    Rejected(String),

    /// The node does not know the requested transaction.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Current node status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub last_round: u64,
}

/// What the node knows about a submitted transaction.
///
/// Returned to callers exactly as the client produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub txid: Option<TxId>,
    /// Round the transaction was committed in; 0 while still pending.
    pub confirmed_round: u64,
    /// Non-empty once the node has dropped the transaction from its pool.
    pub pool_error: String,
    /// Index of the asset created by this transaction, if any.
    pub asset_index: Option<u64>,
    /// Index of the application created by this transaction, if any.
    pub application_index: Option<u64>,
    pub logs: Vec<Vec<u8>>,
}

impl ConfirmationResult {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round > 0
    }
}

/// A ledger node as seen by the orchestration core.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Suggested parameters for transactions built now.
    async fn suggested_params(&self) -> Result<SuggestedParams, NetworkError>;

    /// Submits every blob in a single request. A group is submitted as its
    /// members concatenated in order. Returns the id of the first
    /// transaction.
    async fn submit_raw(&self, blobs: &[SignedBlob]) -> Result<TxId, NetworkError>;

    async fn status(&self) -> Result<NodeStatus, NetworkError>;

    /// Resolves once the node has seen a round after `round`.
    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, NetworkError>;

    async fn pending_transaction_info(
        &self,
        txid: &TxId,
    ) -> Result<ConfirmationResult, NetworkError>;
}
