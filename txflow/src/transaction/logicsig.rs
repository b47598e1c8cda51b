//! Logic signatures.
//!
//! A logic signature authorizes a transaction with a program instead of a
//! secret key. Two flavours:
//!
//! - **Contract account**: no signature attached. The program itself is the
//!   account; its address is `SHA-512/256("Program" || program)`.
//! - **Delegated**: an ordinary account signs `"Program" || program`, letting
//!   anyone holding the lsig spend from that account whenever the program
//!   approves.
//!
//! Program evaluation is the network's job. Locally we only check that the
//! lsig can authorize the sender at all, so an obviously wrong pairing fails
//! before submission.

use serde::{Deserialize, Serialize};

use crate::config::PROGRAM_DOMAIN;
use crate::crypto::hash::{domain_hash, domain_message};
use crate::crypto::keys::{Account, Address, Signature};
use crate::error::{Result, TxFlowError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicSig {
    pub program: Vec<u8>,
    pub args: Vec<Vec<u8>>,
    /// Delegating account's signature over `"Program" || program`.
    pub sig: Option<Signature>,
}

impl LogicSig {
    /// Contract-account lsig for `program` with the given arguments.
    pub fn new(program: Vec<u8>, args: Vec<Vec<u8>>) -> Self {
        Self {
            program,
            args,
            sig: None,
        }
    }

    /// Address of the contract account this program controls.
    pub fn address(&self) -> Address {
        Address::from_bytes(domain_hash(PROGRAM_DOMAIN, &self.program))
    }

    /// Delegates `account`'s spending authority to this program.
    pub fn delegate(mut self, account: &Account) -> Self {
        self.sig = Some(account.sign(&domain_message(PROGRAM_DOMAIN, &self.program)));
        self
    }

    pub fn is_delegated(&self) -> bool {
        self.sig.is_some()
    }

    /// Checks that this lsig can authorize a transaction from `sender`.
    ///
    /// # Errors
    ///
    /// [`TxFlowError::LogicSigRejected`] if the program is empty, if a
    /// contract-account lsig is used for a different address, or if a
    /// delegation signature was not made by `sender`.
    pub fn verify(&self, sender: &Address) -> Result<()> {
        if self.program.is_empty() {
            return Err(TxFlowError::LogicSigRejected("empty program".into()));
        }

        match &self.sig {
            None if self.address() == *sender => Ok(()),
            None => Err(TxFlowError::LogicSigRejected(format!(
                "program address {} does not match sender {}",
                self.address(),
                sender
            ))),
            Some(sig) => {
                let message = domain_message(PROGRAM_DOMAIN, &self.program);
                if sender.verify(&message, sig) {
                    Ok(())
                } else {
                    Err(TxFlowError::LogicSigRejected(format!(
                        "delegation signature is not from sender {}",
                        sender
                    )))
                }
            }
        }
    }
}
