//! Transaction signing.
//!
//! Signing is a separate step from building so that the same unsigned
//! transaction can be grouped first: the group id must be in place before
//! any signature is computed over the canonical bytes.
//!
//! Each [`ExecParams`] picks its own strategy through [`SignType`]; a group
//! freely mixes secret-key and logic-signature members.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::encoding;
use super::exec::{ExecParams, SignType};
use super::logicsig::LogicSig;
use super::types::{Transaction, TxId};
use crate::config::TX_DOMAIN;
use crate::crypto::hash::domain_message;
use crate::crypto::keys::{Account, Address, Signature};
use crate::error::{Result, TxFlowError};

/// A transaction plus its authorization.
///
/// Exactly one of `sig` and `lsig` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub txn: Transaction,
    pub sig: Option<Signature>,
    pub lsig: Option<LogicSig>,
    /// Address of the signing key when it differs from the sender, i.e. the
    /// sender has been rekeyed.
    pub auth_addr: Option<Address>,
}

impl SignedTransaction {
    /// The message a secret-key signature covers: `"TX" || canonical bytes`.
    pub fn signing_message(txn: &Transaction) -> Result<Vec<u8>> {
        Ok(domain_message(TX_DOMAIN, &txn.canonical_bytes()?))
    }

    /// The address whose key (or program) must authorize this transaction.
    pub fn authorizer(&self) -> Address {
        self.auth_addr.unwrap_or(self.txn.sender)
    }

    pub fn txid(&self) -> Result<TxId> {
        self.txn.id()
    }

    /// Canonical encoding, ready for submission.
    pub fn encode(&self) -> Result<SignedBlob> {
        Ok(SignedBlob(encoding::encode(self)?))
    }
}

/// Encoded [`SignedTransaction`] exactly as submitted to the network.
///
/// Opaque once produced: nothing in the crate mutates its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedBlob(Vec<u8>);

impl SignedBlob {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for SignedBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Decodes a blob back into its signed transaction.
pub fn decode_signed_blob(blob: &SignedBlob) -> Result<SignedTransaction> {
    encoding::decode(blob.as_bytes())
}

/// Signs `txn` according to `exec.sign` and encodes the result.
///
/// # Errors
///
/// - [`TxFlowError::InvalidTransaction`] if both a secret key and a logic
///   signature are supplied.
/// - [`TxFlowError::MissingSecretKey`] / [`TxFlowError::MissingLogicSig`] if
///   the credential for the chosen strategy is absent.
/// - [`TxFlowError::LogicSigRejected`] if the logic signature cannot
///   authorize the sender.
pub fn sign_transaction(txn: Transaction, exec: &ExecParams) -> Result<SignedBlob> {
    if exec.from_account.is_some() && exec.lsig.is_some() {
        return Err(TxFlowError::InvalidTransaction(
            "both a secret key and a logic signature were supplied".into(),
        ));
    }

    let signed = match exec.sign {
        SignType::SecretKey => {
            let account = exec
                .from_account
                .as_ref()
                .ok_or(TxFlowError::MissingSecretKey)?;
            sign_with_key(txn, account)?
        }
        SignType::LogicSignature => {
            let lsig = exec.lsig.as_ref().ok_or(TxFlowError::MissingLogicSig)?;
            sign_with_lsig(txn, lsig)?
        }
    };

    let blob = signed.encode()?;
    let txid = signed.txid()?;
    info!(
        txid = %txid,
        tx_type = %signed.txn.tx_type(),
        sign = %exec.sign,
        bytes = blob.len(),
        "signed transaction"
    );
    Ok(blob)
}

/// Ed25519 signature by `account` over the transaction's signing message.
pub fn sign_with_key(txn: Transaction, account: &Account) -> Result<SignedTransaction> {
    let sig = account.sign(&SignedTransaction::signing_message(&txn)?);
    let signer = account.address();
    let auth_addr = (signer != txn.sender).then_some(signer);
    Ok(SignedTransaction {
        txn,
        sig: Some(sig),
        lsig: None,
        auth_addr,
    })
}

/// Attaches `lsig` after checking it can authorize the sender.
pub fn sign_with_lsig(txn: Transaction, lsig: &LogicSig) -> Result<SignedTransaction> {
    lsig.verify(&txn.sender)?;
    Ok(SignedTransaction {
        txn,
        sig: None,
        lsig: Some(lsig.clone()),
        auth_addr: None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
