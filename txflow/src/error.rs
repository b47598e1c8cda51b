//! Error taxonomy for the orchestration core.
//!
//! Every fallible operation in the crate returns [`TxFlowError`]. Nothing is
//! retried internally: blindly resubmitting a transaction can duplicate it,
//! so retry policy belongs to the caller.

use std::path::PathBuf;

use thiserror::Error;

use crate::network::NetworkError;

/// Errors surfaced by parameter resolution, building, signing, grouping,
/// submission and replay.
#[derive(Debug, Error)]
pub enum TxFlowError {
    /// The network reported first round 0: it is not producing rounds yet.
    /// Retry later.
    #[error("network is not progressing: suggested first round is 0")]
    StaleNetwork,

    /// Malformed domain input caught at construction time.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// `SignType::LogicSignature` was requested but no logic signature was
    /// supplied.
    #[error("logic signature required but not provided")]
    MissingLogicSig,

    /// `SignType::SecretKey` was requested but no secret key was supplied.
    #[error("secret key required but not provided")]
    MissingSecretKey,

    /// A sign type name or tag that is not part of the protocol.
    #[error("unknown sign type: {0}")]
    UnknownSignType(String),

    /// The logic signature does not authorize the transaction sender.
    #[error("logic signature rejected: {0}")]
    LogicSigRejected(String),

    /// More transactions than an atomic group may hold.
    #[error("group size {size} exceeds maximum of {max}")]
    GroupSizeExceeded {
        /// Number of transactions requested.
        size: usize,
        /// Protocol maximum.
        max: usize,
    },

    /// No signed blob exists at the given path.
    #[error("signed transaction file not found: {0}")]
    FileNotFound(PathBuf),

    /// The network client failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The network accepted the submission but dropped the transaction
    /// from its pool.
    #[error("transaction {txid} rejected: {reason}")]
    Rejected {
        /// Transaction id (base58).
        txid: String,
        /// Pool error reported by the network.
        reason: String,
    },

    /// The transaction was not confirmed within the allowed window.
    #[error("transaction {txid} not confirmed after {rounds} rounds")]
    ConfirmationTimeout {
        /// Transaction id (base58).
        txid: String,
        /// Rounds waited.
        rounds: u64,
    },

    /// Canonical encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Filesystem failure other than a missing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TxFlowError>;
