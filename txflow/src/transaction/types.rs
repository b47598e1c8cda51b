//! Core transaction types.
//!
//! A [`Transaction`] is a common header (sender, fee, validity window,
//! genesis, note, lease, rekey, group) plus a typed [`TxBody`]. The builder
//! owns a transaction until the signer takes it; the only mutation allowed
//! after construction is assigning the atomic-group id.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::encoding;
use crate::config::TX_DOMAIN;
use crate::crypto::hash::domain_hash;
use crate::crypto::keys::Address;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Transaction id: `SHA-512/256("TX" || canonical bytes)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxId([u8; 32]);

impl TxId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self)
    }
}

/// Atomic group id shared by every member of a group.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId([u8; 32]);

impl GroupId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self)
    }
}

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// Wire-level transaction type, derived from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    /// Native token payment.
    Payment,
    /// Asset transfer, opt-in or clawback.
    AssetTransfer,
    /// Asset create, reconfigure or destroy.
    AssetConfig,
    /// Asset freeze or unfreeze of a holding.
    AssetFreeze,
    /// Application call.
    ApplicationCall,
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payment => write!(f, "pay"),
            Self::AssetTransfer => write!(f, "axfer"),
            Self::AssetConfig => write!(f, "acfg"),
            Self::AssetFreeze => write!(f, "afrz"),
            Self::ApplicationCall => write!(f, "appl"),
        }
    }
}

// ---------------------------------------------------------------------------
// Asset & Application Value Types
// ---------------------------------------------------------------------------

/// On-chain asset parameters, as carried by an asset-config transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    pub metadata_hash: Option<[u8; 32]>,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

/// What an application call does besides running the approval program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OnComplete {
    #[default]
    NoOp,
    OptIn,
    CloseOut,
    ClearState,
    Update,
    Delete,
}

/// Global or local storage reserved by an application at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSchema {
    pub num_uints: u64,
    pub num_byte_slices: u64,
}

// ---------------------------------------------------------------------------
// TxBody
// ---------------------------------------------------------------------------

/// Type-specific transaction fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxBody {
    Payment {
        receiver: Address,
        amount: u64,
        close_remainder_to: Option<Address>,
    },
    AssetTransfer {
        asset_id: u64,
        receiver: Address,
        amount: u64,
        close_to: Option<Address>,
        /// Holder the asset is clawed back from. Only the clawback address
        /// may set this.
        revocation_target: Option<Address>,
    },
    /// `asset_id == 0` creates; `params == None` destroys.
    AssetConfig {
        asset_id: u64,
        params: Option<AssetParams>,
    },
    AssetFreeze {
        asset_id: u64,
        target: Address,
        frozen: bool,
    },
    ApplicationCall {
        /// 0 creates a new application.
        app_id: u64,
        on_complete: OnComplete,
        args: Vec<Vec<u8>>,
        accounts: Vec<Address>,
        foreign_apps: Vec<u64>,
        foreign_assets: Vec<u64>,
        approval_program: Option<Vec<u8>>,
        clear_program: Option<Vec<u8>>,
        global_schema: Option<StateSchema>,
        local_schema: Option<StateSchema>,
    },
}

impl TxBody {
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Payment { .. } => TxType::Payment,
            Self::AssetTransfer { .. } => TxType::AssetTransfer,
            Self::AssetConfig { .. } => TxType::AssetConfig,
            Self::AssetFreeze { .. } => TxType::AssetFreeze,
            Self::ApplicationCall { .. } => TxType::ApplicationCall,
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// An unsigned ledger transaction.
///
/// # Canonical Bytes
///
/// [`Transaction::canonical_bytes`] is the bincode encoding of the struct in
/// declaration order. The transaction id and the secret-key signature are
/// both computed over `"TX" || canonical_bytes`, so reordering or adding a
/// field here changes every id the crate produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    /// Total fee in micro-units, already resolved from the fee policy.
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub note: Option<Vec<u8>>,
    pub lease: Option<[u8; 32]>,
    pub rekey_to: Option<Address>,
    pub group: Option<GroupId>,
    pub body: TxBody,
}

impl Transaction {
    pub fn tx_type(&self) -> TxType {
        self.body.tx_type()
    }

    /// Deterministic encoding used for ids, signatures and size estimates.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        encoding::encode(self)
    }

    /// `SHA-512/256("TX" || canonical bytes)`. Includes the group id if one
    /// has been assigned.
    pub fn id(&self) -> Result<TxId> {
        Ok(TxId(domain_hash(TX_DOMAIN, &self.canonical_bytes()?)))
    }

    /// Id of this transaction with the group field cleared. Group ids are
    /// computed over these so that assigning the group does not feed back
    /// into its own hash.
    pub fn ungrouped_id(&self) -> Result<TxId> {
        if self.group.is_none() {
            return self.id();
        }
        let mut copy = self.clone();
        copy.group = None;
        copy.id()
    }

    /// Sets the atomic-group id. The only mutation permitted after build.
    pub fn assign_group(&mut self, group: GroupId) {
        self.group = Some(group);
    }

    /// Returns `true` if `round` lies inside `[first_valid, last_valid]`.
    pub fn is_valid_at(&self, round: u64) -> bool {
        self.first_valid <= round && round <= self.last_valid
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
