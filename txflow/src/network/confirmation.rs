//! Waiting for confirmation.

use tracing::{debug, info, warn};

use super::{ConfirmationResult, NetworkClient};
use crate::error::{Result, TxFlowError};
use crate::transaction::types::TxId;

/// Polls `client` until `txid` is confirmed, rejected, or `max_rounds`
/// rounds have passed since the call started.
///
/// The pending info is checked at least once, so `max_rounds == 0` still
/// returns a transaction that is already confirmed.
///
/// # Errors
///
/// - [`TxFlowError::Rejected`] if the node reports a pool error.
/// - [`TxFlowError::ConfirmationTimeout`] after `max_rounds` rounds.
/// - [`TxFlowError::Network`] if any client call fails.
pub async fn wait_for_confirmation<C>(
    client: &C,
    txid: &TxId,
    max_rounds: u64,
) -> Result<ConfirmationResult>
where
    C: NetworkClient + ?Sized,
{
    let start = client.status().await?.last_round;
    let deadline = start.saturating_add(max_rounds);
    let mut round = start;

    loop {
        let info = client.pending_transaction_info(txid).await?;

        if info.is_confirmed() {
            info!(
                txid = %txid,
                confirmed_round = info.confirmed_round,
                asset_index = ?info.asset_index,
                application_index = ?info.application_index,
                "transaction confirmed"
            );
            return Ok(info);
        }

        if !info.pool_error.is_empty() {
            warn!(txid = %txid, reason = %info.pool_error, "transaction dropped from pool");
            return Err(TxFlowError::Rejected {
                txid: txid.to_string(),
                reason: info.pool_error,
            });
        }

        if round >= deadline {
            return Err(TxFlowError::ConfirmationTimeout {
                txid: txid.to_string(),
                rounds: max_rounds,
            });
        }

        debug!(txid = %txid, round, "waiting for next round");
        client.status_after_block(round).await?;
        round += 1;
    }
}
