//! # Transaction Module
//!
//! Everything between "the caller wants this to happen" and "these bytes go
//! to the network". Each step is a pure function; the executor strings them
//! together.
//!
//! ## Architecture
//!
//! ```text
//! exec.rs      — ExecParams, Operation, SignType: what the caller asks for
//! params.rs    — SuggestedParams + UserTxParams -> NetworkParams
//! note.rs      — note-field precedence and base64 decoding
//! types.rs     — Transaction, TxBody, TxId, GroupId
//! encoding.rs  — canonical bincode encoding
//! builder.rs   — ExecParams + NetworkParams -> Transaction
//! group.rs     — atomic group ids
//! logicsig.rs  — program-based authorization
//! signing.rs   — Transaction -> SignedBlob
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Resolve** — [`params::resolve`] merges the network snapshot with
//!    the caller's pay flags.
//! 2. **Build** — [`build_transaction`] validates and produces an unsigned
//!    [`Transaction`].
//! 3. **Group** — [`assign_group_id`] stamps 2–16 members with one id.
//! 4. **Sign** — [`sign_transaction`] applies the member's own strategy.
//!
//! Grouping must happen before signing: the group id is part of the signed
//! bytes.

pub mod builder;
pub mod encoding;
pub mod exec;
pub mod group;
pub mod logicsig;
pub mod note;
pub mod params;
pub mod signing;
pub mod types;

pub use builder::{build_transaction, TransactionBuilder};
pub use exec::{AppCall, AssetDefinition, ExecParams, Operation, SignType};
pub use group::{assign_group_id, compute_group_id, ensure_group_size, TxGroup};
pub use logicsig::LogicSig;
pub use note::{encode_note, resolve_note};
pub use params::{resolve, NetworkParams, SuggestedParams, UserTxParams};
pub use signing::{decode_signed_blob, sign_transaction, SignedBlob, SignedTransaction};
pub use types::{
    AssetParams, GroupId, OnComplete, StateSchema, Transaction, TxBody, TxId, TxType,
};
