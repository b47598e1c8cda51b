//! Network parameter resolution.
//!
//! The network client hands back [`SuggestedParams`] once per submission
//! call. Each transaction then merges that snapshot with its own
//! [`UserTxParams`] through [`resolve`], which is pure: the snapshot is only
//! borrowed and every transaction gets its own [`NetworkParams`] value.

use serde::{Deserialize, Serialize};

use crate::config::MIN_TX_FEE;
use crate::crypto::keys::Address;
use crate::error::{Result, TxFlowError};

/// Raw parameters as reported by the network client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedParams {
    /// First round a new transaction may be valid in. 0 means the network
    /// has not produced a usable round yet.
    pub first_round: u64,
    /// Last round of the default validity window.
    pub last_round: u64,
    /// Suggested fee per byte. Informational: [`resolve`] takes the fee
    /// from the caller's overrides or [`MIN_TX_FEE`], never from here.
    pub fee_per_byte: u64,
    /// Network minimum fee. Informational, like `fee_per_byte`; a node
    /// enforces it on submission.
    pub min_fee: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

/// Per-transaction overrides supplied by the caller ("pay flags").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserTxParams {
    /// Flat total fee. Forces flat-fee mode and wins over `fee_per_byte`.
    pub total_fee: Option<u64>,
    pub fee_per_byte: Option<u64>,
    /// Overrides the network's first round.
    pub first_valid: Option<u64>,
    /// Window length; only applied together with `first_valid`.
    pub valid_rounds: Option<u64>,
    /// Exclusive-use lease, 32 bytes when present.
    pub lease: Option<Vec<u8>>,
    /// Re-key the sender to a new authorized address.
    pub rekey_to: Option<Address>,
    /// Close the sender's native balance into this address (payments only).
    pub close_remainder_to: Option<Address>,
}

impl UserTxParams {
    /// Flat fee of `fee` micro-units.
    pub fn with_total_fee(mut self, fee: u64) -> Self {
        self.total_fee = Some(fee);
        self
    }

    pub fn with_fee_per_byte(mut self, fee: u64) -> Self {
        self.fee_per_byte = Some(fee);
        self
    }

    /// Validity window `[first_valid, first_valid + valid_rounds]`.
    pub fn with_window(mut self, first_valid: u64, valid_rounds: u64) -> Self {
        self.first_valid = Some(first_valid);
        self.valid_rounds = Some(valid_rounds);
        self
    }
}

/// Final parameters a transaction is built with. Immutable once merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub first_round: u64,
    pub last_round: u64,
    /// Total fee when `flat_fee`, otherwise fee per byte.
    pub fee: u64,
    pub flat_fee: bool,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

/// Merges the network snapshot with caller overrides.
///
/// - `flat_fee` is set iff `total_fee` is given.
/// - `fee = total_fee ?? fee_per_byte ?? MIN_TX_FEE`, clamped up to
///   `MIN_TX_FEE` in flat mode.
/// - `first_round = first_valid ?? raw.first_round`.
/// - `last_round = first_valid + valid_rounds` when both are given, else
///   `raw.last_round`.
///
/// # Errors
///
/// [`TxFlowError::StaleNetwork`] if `raw.first_round` is 0;
/// [`TxFlowError::InvalidTransaction`] if the window overflows, starts at
/// round 0 or ends before it starts.
pub fn resolve(raw: &SuggestedParams, user: &UserTxParams) -> Result<NetworkParams> {
    if raw.first_round == 0 {
        return Err(TxFlowError::StaleNetwork);
    }

    let flat_fee = user.total_fee.is_some();
    let mut fee = user.total_fee.or(user.fee_per_byte).unwrap_or(MIN_TX_FEE);
    if flat_fee {
        fee = fee.max(MIN_TX_FEE);
    }

    let first_round = user.first_valid.unwrap_or(raw.first_round);
    let last_round = match (user.first_valid, user.valid_rounds) {
        (Some(first), Some(rounds)) => first.checked_add(rounds).ok_or_else(|| {
            TxFlowError::InvalidTransaction(format!(
                "validity window overflows: {} + {}",
                first, rounds
            ))
        })?,
        _ => raw.last_round,
    };

    if first_round == 0 {
        return Err(TxFlowError::InvalidTransaction(
            "first valid round must be at least 1".into(),
        ));
    }

    if first_round > last_round {
        return Err(TxFlowError::InvalidTransaction(format!(
            "first valid round {} is after last valid round {}",
            first_round, last_round
        )));
    }

    Ok(NetworkParams {
        first_round,
        last_round,
        fee,
        flat_fee,
        genesis_id: raw.genesis_id.clone(),
        genesis_hash: raw.genesis_hash,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
