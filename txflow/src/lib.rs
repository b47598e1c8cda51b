// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # txflow — Transaction Orchestration Core
//!
//! Sits between deployment tooling and a ledger network. Given a description
//! of what should happen ([`ExecParams`]), it resolves fees and validity
//! windows against the network, builds protocol-correct transactions, signs
//! each with its own strategy, binds batches into atomic groups, submits
//! them in one call and waits (bounded) for confirmation. Blobs signed
//! earlier can be replayed from disk.
//!
//! ## Architecture
//!
//! - **config** — Protocol limits and [`ExecutorConfig`].
//! - **crypto** — SHA-512/256 with domain prefixes, Ed25519 accounts.
//! - **transaction** — Params, notes, builder, groups, logic sigs, signing.
//! - **network** — The [`NetworkClient`] seam, confirmation wait, and an
//!   in-memory [`LocalLedger`].
//! - **executor** — [`SubmissionExecutor`]: the whole pipeline.
//! - **replay** — [`SignedBlobReplayer`] for pre-signed blobs.
//! - **logging** — Optional `tracing-subscriber` setup for hosts.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use txflow::{Account, ExecParams, ExecutorConfig, LocalLedger, Operation, SubmissionExecutor};
//!
//! # async fn run() -> txflow::Result<()> {
//! let ledger = Arc::new(LocalLedger::new(Default::default()));
//! let executor = SubmissionExecutor::new(ledger, ExecutorConfig::default());
//!
//! let alice = Account::generate();
//! let bob = Account::generate();
//! let result = executor
//!     .execute_one(ExecParams::secret_key(
//!         &alice,
//!         Operation::Payment { to: bob.address(), amount: 1_000_000 },
//!     ))
//!     .await?;
//! println!("confirmed in round {}", result.confirmed_round);
//! # Ok(()) }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod executor;
pub mod logging;
pub mod network;
pub mod replay;
pub mod transaction;

pub use config::ExecutorConfig;
pub use crypto::{Account, Address};
pub use error::{Result, TxFlowError};
pub use executor::{ExecRequest, SubmissionExecutor};
pub use network::{
    ConfirmationResult, LocalLedger, LocalLedgerConfig, NetworkClient, NetworkError, NodeStatus,
};
pub use replay::{write_signed_blob, BlobLoader, FsBlobLoader, SignedBlobReplayer};
pub use transaction::{
    AssetDefinition, ExecParams, LogicSig, Operation, SignType, SignedBlob, UserTxParams,
};
