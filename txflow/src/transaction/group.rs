//! Atomic groups.
//!
//! Up to [`MAX_GROUP_SIZE`] transactions can be bound together so that the
//! network applies all of them or none. Binding works by stamping every
//! member with the same [`GroupId`], computed over the ordered member ids
//! before any of them is signed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::encoding;
use super::types::{GroupId, Transaction, TxId};
use crate::config::{MAX_GROUP_SIZE, TX_GROUP_DOMAIN};
use crate::crypto::hash::domain_hash;
use crate::error::{Result, TxFlowError};

/// The hashed form of a group: member ids in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxGroup {
    pub txids: Vec<TxId>,
}

impl TxGroup {
    /// Collects the ungrouped ids of `txns`, in order.
    pub fn from_transactions(txns: &[Transaction]) -> Result<Self> {
        let txids = txns
            .iter()
            .map(Transaction::ungrouped_id)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { txids })
    }

    /// `SHA-512/256("TG" || canonical bytes)`.
    pub fn id(&self) -> Result<GroupId> {
        Ok(GroupId::from_bytes(domain_hash(
            TX_GROUP_DOMAIN,
            &encoding::encode(self)?,
        )))
    }
}

/// Fails with [`TxFlowError::GroupSizeExceeded`] when `size` is over the
/// protocol maximum. Callers run this before any network I/O.
pub fn ensure_group_size(size: usize) -> Result<()> {
    if size > MAX_GROUP_SIZE {
        return Err(TxFlowError::GroupSizeExceeded {
            size,
            max: MAX_GROUP_SIZE,
        });
    }
    Ok(())
}

/// Group id for `txns` in the given order.
///
/// Any group id already present on a member is ignored, so recomputing over
/// an assigned group yields the same value.
pub fn compute_group_id(txns: &[Transaction]) -> Result<GroupId> {
    if txns.is_empty() {
        return Err(TxFlowError::InvalidTransaction(
            "cannot group zero transactions".into(),
        ));
    }
    ensure_group_size(txns.len())?;
    TxGroup::from_transactions(txns)?.id()
}

/// Stamps every member of `txns` with their common group id.
pub fn assign_group_id(mut txns: Vec<Transaction>) -> Result<Vec<Transaction>> {
    let gid = compute_group_id(&txns)?;
    for txn in &mut txns {
        txn.assign_group(gid);
    }
    debug!(group = %gid, members = txns.len(), "assigned group id");
    Ok(txns)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
