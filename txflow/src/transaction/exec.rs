//! Caller-facing transaction descriptions.
//!
//! An [`ExecParams`] says everything needed to produce one signed
//! transaction: what to do ([`Operation`]), who sends it, how to sign it
//! ([`SignType`] plus exactly one credential), optional notes and the
//! caller's fee/validity overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::logicsig::LogicSig;
use super::params::UserTxParams;
use super::types::{OnComplete, StateSchema};
use crate::crypto::keys::{Account, Address};
use crate::error::TxFlowError;

// ---------------------------------------------------------------------------
// SignType
// ---------------------------------------------------------------------------

/// How a transaction is authorized. The set is fixed by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignType {
    /// Ed25519 signature with the sender's secret key.
    SecretKey,
    /// Program-based authorization (contract account or delegation).
    LogicSignature,
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretKey => write!(f, "secret-key"),
            Self::LogicSignature => write!(f, "logic-signature"),
        }
    }
}

impl FromStr for SignType {
    type Err = TxFlowError;

    /// Accepts the display names plus the short forms `sk` and `lsig`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "secret-key" | "secret_key" | "secretkey" | "sk" => Ok(Self::SecretKey),
            "logic-signature" | "logic_signature" | "logicsignature" | "lsig" => {
                Ok(Self::LogicSignature)
            }
            _ => Err(TxFlowError::UnknownSignType(s.to_string())),
        }
    }
}

impl TryFrom<u8> for SignType {
    type Error = TxFlowError;

    /// Numeric tags as used by tooling that stores plans compactly:
    /// 0 = secret key, 1 = logic signature.
    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::SecretKey),
            1 => Ok(Self::LogicSignature),
            other => Err(TxFlowError::UnknownSignType(format!("tag {}", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// AssetDefinition
// ---------------------------------------------------------------------------

/// Everything needed to create an asset, including an optional note that is
/// used when the transaction itself carries none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetDefinition {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    pub metadata_hash: Option<Vec<u8>>,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
    pub note: Option<Vec<u8>>,
    pub note_b64: Option<String>,
}

impl AssetDefinition {
    pub fn new(total: u64, decimals: u32, unit_name: &str, asset_name: &str) -> Self {
        Self {
            total,
            decimals,
            unit_name: unit_name.to_string(),
            asset_name: asset_name.to_string(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The action a transaction performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Native token payment. `close_remainder_to` comes from the pay flags.
    Payment { to: Address, amount: u64 },
    AssetTransfer {
        asset_id: u64,
        to: Address,
        amount: u64,
        close_to: Option<Address>,
    },
    /// Registers a holding of `asset_id` for the sender.
    AssetOptIn { asset_id: u64 },
    AssetCreate { definition: AssetDefinition },
    /// Changes the management addresses of an existing asset. `None` clears
    /// the address, which is permanent.
    AssetConfig {
        asset_id: u64,
        manager: Option<Address>,
        reserve: Option<Address>,
        freeze: Option<Address>,
        clawback: Option<Address>,
    },
    AssetFreeze {
        asset_id: u64,
        target: Address,
        frozen: bool,
    },
    /// Clawback: move `amount` from `revocation_target` to `to`.
    AssetRevoke {
        asset_id: u64,
        revocation_target: Address,
        to: Address,
        amount: u64,
    },
    AssetDestroy { asset_id: u64 },
    ApplicationCall(AppCall),
}

/// Application call fields. `app_id == 0` with both programs creates an app.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppCall {
    pub app_id: u64,
    pub on_complete: OnComplete,
    pub args: Vec<Vec<u8>>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
    pub approval_program: Option<Vec<u8>>,
    pub clear_program: Option<Vec<u8>>,
    pub global_schema: Option<StateSchema>,
    pub local_schema: Option<StateSchema>,
}

// ---------------------------------------------------------------------------
// ExecParams
// ---------------------------------------------------------------------------

/// One transaction's full description.
///
/// Exactly one credential must match `sign`: `from_account` for
/// [`SignType::SecretKey`], `lsig` for [`SignType::LogicSignature`].
/// Supplying both is rejected at signing time.
#[derive(Debug, Clone)]
pub struct ExecParams {
    pub from: Address,
    pub operation: Operation,
    pub sign: SignType,
    pub from_account: Option<Account>,
    pub lsig: Option<LogicSig>,
    pub note: Option<Vec<u8>>,
    pub note_b64: Option<String>,
    pub pay_flags: UserTxParams,
}

impl ExecParams {
    /// Secret-key signed transaction from `account`.
    pub fn secret_key(account: &Account, operation: Operation) -> Self {
        Self {
            from: account.address(),
            operation,
            sign: SignType::SecretKey,
            from_account: Some(account.clone()),
            lsig: None,
            note: None,
            note_b64: None,
            pay_flags: UserTxParams::default(),
        }
    }

    /// Logic-signature signed transaction from `from` (the contract address
    /// or the delegating account).
    pub fn logic_sig(from: Address, lsig: LogicSig, operation: Operation) -> Self {
        Self {
            from,
            operation,
            sign: SignType::LogicSignature,
            from_account: None,
            lsig: Some(lsig),
            note: None,
            note_b64: None,
            pay_flags: UserTxParams::default(),
        }
    }

    pub fn with_note(mut self, note: &[u8]) -> Self {
        self.note = Some(note.to_vec());
        self
    }

    pub fn with_note_b64(mut self, note_b64: &str) -> Self {
        self.note_b64 = Some(note_b64.to_string());
        self
    }

    pub fn with_pay_flags(mut self, flags: UserTxParams) -> Self {
        self.pay_flags = flags;
        self
    }
}
