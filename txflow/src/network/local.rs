//! In-memory ledger.
//!
//! [`LocalLedger`] implements [`NetworkClient`] without a node. It checks
//! what a real node would check before accepting a submission (genesis,
//! validity window, minimum fee, signatures, logic signatures, group ids)
//! and confirms accepted transactions when the round advances. Rounds only
//! advance when a caller waits for one, so tests are deterministic and
//! never sleep.
//!
//! A few switches simulate unhealthy networks: a stalled node reporting
//! round 0, a node refusing submissions, a pool that silently drops
//! transactions and a pool that never confirms them.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ConfirmationResult, NetworkClient, NetworkError, NodeStatus};
use crate::config::MIN_TX_FEE;
use crate::crypto::keys::Address;
use crate::transaction::group::compute_group_id;
use crate::transaction::params::SuggestedParams;
use crate::transaction::signing::{decode_signed_blob, SignedBlob, SignedTransaction};
use crate::transaction::types::{OnComplete, TxBody, TxId};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Genesis and fee settings for a [`LocalLedger`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalLedgerConfig {
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    /// Round the ledger starts at.
    pub start_round: u64,
    /// Length of the validity window handed out in suggested params.
    pub validity_window: u64,
    pub fee_per_byte: u64,
    pub min_fee: u64,
    /// First index handed to a created asset or application.
    pub first_index: u64,
}

impl Default for LocalLedgerConfig {
    fn default() -> Self {
        Self {
            genesis_id: "localnet-v1".into(),
            genesis_hash: [0x4c; 32],
            start_round: 1_000,
            validity_window: 1_000,
            fee_per_byte: 0,
            min_fee: MIN_TX_FEE,
            first_index: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PendingEntry {
    stx: SignedTransaction,
    pool_error: String,
}

#[derive(Debug)]
struct LedgerState {
    round: u64,
    stalled: bool,
    reject_reason: Option<String>,
    pool_error: Option<String>,
    hold: bool,
    pending: HashMap<TxId, PendingEntry>,
    /// Pending ids in submission order, so confirmation order is stable.
    pending_order: Vec<TxId>,
    confirmed: HashMap<TxId, ConfirmationResult>,
    /// Authorized signer per rekeyed account.
    auth: HashMap<Address, Address>,
    next_index: u64,
}

/// In-memory [`NetworkClient`].
pub struct LocalLedger {
    config: LocalLedgerConfig,
    state: RwLock<LedgerState>,
    params_fetches: AtomicUsize,
    submissions: AtomicUsize,
}

impl LocalLedger {
    pub fn new(config: LocalLedgerConfig) -> Self {
        let state = LedgerState {
            round: config.start_round,
            stalled: false,
            reject_reason: None,
            pool_error: None,
            hold: false,
            pending: HashMap::new(),
            pending_order: Vec::new(),
            confirmed: HashMap::new(),
            auth: HashMap::new(),
            next_index: config.first_index,
        };
        Self {
            config,
            state: RwLock::new(state),
            params_fetches: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &LocalLedgerConfig {
        &self.config
    }

    pub fn current_round(&self) -> u64 {
        self.state.read().round
    }

    /// Number of `suggested_params` calls so far.
    pub fn params_fetches(&self) -> usize {
        self.params_fetches.load(Ordering::SeqCst)
    }

    /// Number of `submit_raw` calls so far, accepted or not.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Makes suggested params report first round 0.
    pub fn set_stalled(&self, stalled: bool) {
        self.state.write().stalled = stalled;
    }

    /// Refuse every submission with `reason`.
    pub fn reject_submissions(&self, reason: Option<String>) {
        self.state.write().reject_reason = reason;
    }

    /// Accept submissions but drop them from the pool with `reason`.
    pub fn drop_from_pool(&self, reason: Option<String>) {
        self.state.write().pool_error = reason;
    }

    /// Accept submissions but never confirm them.
    pub fn hold_pending(&self, hold: bool) {
        self.state.write().hold = hold;
    }

    /// Moves to the next round, confirming everything pending.
    pub fn advance_round(&self) -> u64 {
        let mut state = self.state.write();
        Self::advance(&mut state)
    }

    /// Confirmed result for `txid`, if any.
    pub fn confirmed(&self, txid: &TxId) -> Option<ConfirmationResult> {
        self.state.read().confirmed.get(txid).cloned()
    }

    fn advance(state: &mut LedgerState) -> u64 {
        state.round += 1;
        let round = state.round;

        if state.hold {
            return round;
        }

        let order = std::mem::take(&mut state.pending_order);
        let mut still_pending = Vec::new();
        for txid in order {
            let Some(entry) = state.pending.get(&txid).cloned() else {
                continue;
            };
            if !entry.pool_error.is_empty() {
                still_pending.push(txid);
                continue;
            }
            state.pending.remove(&txid);

            let txn = &entry.stx.txn;
            let mut result = ConfirmationResult {
                txid: Some(txid),
                confirmed_round: round,
                ..Default::default()
            };
            match &txn.body {
                TxBody::AssetConfig { asset_id: 0, .. } => {
                    result.asset_index = Some(state.next_index);
                    state.next_index += 1;
                }
                TxBody::ApplicationCall {
                    app_id: 0,
                    on_complete,
                    ..
                } if *on_complete != OnComplete::ClearState => {
                    result.application_index = Some(state.next_index);
                    state.next_index += 1;
                }
                _ => {}
            }
            if let Some(new_auth) = txn.rekey_to {
                if new_auth == txn.sender {
                    state.auth.remove(&txn.sender);
                } else {
                    state.auth.insert(txn.sender, new_auth);
                }
            }

            debug!(txid = %txid, round, "local ledger confirmed transaction");
            state.confirmed.insert(txid, result);
        }
        state.pending_order = still_pending;
        round
    }

    fn check_submission(
        &self,
        state: &LedgerState,
        stxns: &[SignedTransaction],
    ) -> Result<Vec<TxId>, NetworkError> {
        let landing_round = state.round + 1;
        let mut txids = Vec::with_capacity(stxns.len());
        let mut seen = HashSet::with_capacity(stxns.len());

        for stx in stxns {
            let txn = &stx.txn;
            let txid = txn.id().map_err(reject)?;

            if txn.genesis_id != self.config.genesis_id || txn.genesis_hash != self.config.genesis_hash
            {
                return Err(NetworkError::Rejected(format!(
                    "{}: genesis mismatch",
                    txid
                )));
            }
            if !txn.is_valid_at(landing_round) {
                return Err(NetworkError::Rejected(format!(
                    "{}: round {} outside validity window [{}, {}]",
                    txid, landing_round, txn.first_valid, txn.last_valid
                )));
            }
            if txn.fee < self.config.min_fee {
                return Err(NetworkError::Rejected(format!(
                    "{}: fee {} below minimum {}",
                    txid, txn.fee, self.config.min_fee
                )));
            }
            if state.pending.contains_key(&txid) || state.confirmed.contains_key(&txid) {
                return Err(NetworkError::Rejected(format!(
                    "{}: transaction already in ledger",
                    txid
                )));
            }
            if !seen.insert(txid) {
                return Err(NetworkError::Rejected(format!(
                    "{}: transaction repeated within submission",
                    txid
                )));
            }

            let expected = state.auth.get(&txn.sender).copied().unwrap_or(txn.sender);
            match (&stx.sig, &stx.lsig) {
                (Some(sig), None) => {
                    if stx.authorizer() != expected {
                        return Err(NetworkError::Rejected(format!(
                            "{}: should have been authorized by {} but was {}",
                            txid,
                            expected,
                            stx.authorizer()
                        )));
                    }
                    let message = SignedTransaction::signing_message(txn).map_err(reject)?;
                    if !expected.verify(&message, sig) {
                        return Err(NetworkError::Rejected(format!(
                            "{}: invalid signature",
                            txid
                        )));
                    }
                }
                (None, Some(lsig)) => lsig.verify(&expected).map_err(reject)?,
                _ => {
                    return Err(NetworkError::Rejected(format!(
                        "{}: exactly one of sig and lsig must be set",
                        txid
                    )))
                }
            }

            txids.push(txid);
        }

        self.check_group(stxns)?;
        Ok(txids)
    }

    fn check_group(&self, stxns: &[SignedTransaction]) -> Result<(), NetworkError> {
        let groups: Vec<_> = stxns.iter().map(|s| s.txn.group).collect();

        match groups.first().copied().flatten() {
            None if groups.len() == 1 => Ok(()),
            None => Err(NetworkError::Rejected(
                "multiple transactions submitted without a group id".into(),
            )),
            Some(gid) => {
                if groups.iter().any(|g| *g != Some(gid)) {
                    return Err(NetworkError::Rejected(
                        "group members carry different group ids".into(),
                    ));
                }
                let txns: Vec<_> = stxns.iter().map(|s| s.txn.clone()).collect();
                let expected = compute_group_id(&txns).map_err(reject)?;
                if expected != gid {
                    return Err(NetworkError::Rejected(format!(
                        "group id {} does not match members (expected {})",
                        gid, expected
                    )));
                }
                Ok(())
            }
        }
    }
}

fn reject(e: impl std::fmt::Display) -> NetworkError {
    NetworkError::Rejected(e.to_string())
}

// ---------------------------------------------------------------------------
// NetworkClient
// ---------------------------------------------------------------------------

#[async_trait]
impl NetworkClient for LocalLedger {
    async fn suggested_params(&self) -> Result<SuggestedParams, NetworkError> {
        self.params_fetches.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read();
        let first_round = if state.stalled { 0 } else { state.round };
        Ok(SuggestedParams {
            first_round,
            last_round: first_round + self.config.validity_window,
            fee_per_byte: self.config.fee_per_byte,
            min_fee: self.config.min_fee,
            genesis_id: self.config.genesis_id.clone(),
            genesis_hash: self.config.genesis_hash,
        })
    }

    async fn submit_raw(&self, blobs: &[SignedBlob]) -> Result<TxId, NetworkError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        if blobs.is_empty() {
            return Err(NetworkError::Rejected("empty submission".into()));
        }
        let stxns = blobs
            .iter()
            .map(decode_signed_blob)
            .collect::<Result<Vec<_>, _>>()
            .map_err(reject)?;

        let mut state = self.state.write();
        if let Some(reason) = &state.reject_reason {
            return Err(NetworkError::Rejected(reason.clone()));
        }

        let txids = self.check_submission(&state, &stxns)?;
        let pool_error = state.pool_error.clone().unwrap_or_default();
        for (txid, stx) in txids.iter().zip(stxns) {
            state.pending.insert(
                *txid,
                PendingEntry {
                    stx,
                    pool_error: pool_error.clone(),
                },
            );
            state.pending_order.push(*txid);
        }

        debug!(count = txids.len(), round = state.round, "local ledger accepted submission");
        Ok(txids[0])
    }

    async fn status(&self) -> Result<NodeStatus, NetworkError> {
        Ok(NodeStatus {
            last_round: self.state.read().round,
        })
    }

    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, NetworkError> {
        let mut state = self.state.write();
        while state.round <= round {
            Self::advance(&mut state);
        }
        Ok(NodeStatus {
            last_round: state.round,
        })
    }

    async fn pending_transaction_info(
        &self,
        txid: &TxId,
    ) -> Result<ConfirmationResult, NetworkError> {
        let state = self.state.read();
        if let Some(result) = state.confirmed.get(txid) {
            return Ok(result.clone());
        }
        match state.pending.get(txid) {
            Some(entry) => Ok(ConfirmationResult {
                txid: Some(*txid),
                pool_error: entry.pool_error.clone(),
                ..Default::default()
            }),
            None => Err(NetworkError::NotFound(txid.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
