//! Transaction construction.
//!
//! [`build_transaction`] maps an [`ExecParams`] plus resolved
//! [`NetworkParams`] to an unsigned [`Transaction`]. It is a pure function:
//! same inputs, byte-identical output. All protocol limits are checked here
//! so malformed input fails at construction instead of at submission.
//!
//! The lower-level [`TransactionBuilder`] assembles the common header and
//! works out the fee; the operation mapping only has to produce a body.

use super::exec::{AppCall, AssetDefinition, ExecParams, Operation};
use super::note::resolve_note;
use super::params::NetworkParams;
use super::types::{AssetParams, OnComplete, Transaction, TxBody};
use crate::config::{
    ASSET_METADATA_HASH_LENGTH, LEASE_LENGTH, MAX_APP_ACCOUNTS, MAX_APP_ARGS,
    MAX_APP_PROGRAM_BYTES, MAX_APP_TOTAL_ARG_BYTES, MAX_APP_TOTAL_REFERENCES,
    MAX_ASSET_DECIMALS, MAX_ASSET_NAME_BYTES, MAX_ASSET_URL_BYTES, MAX_UNIT_NAME_BYTES,
    MIN_TX_FEE, SIGNATURE_SIZE_OVERHEAD,
};
use crate::crypto::keys::Address;
use crate::error::{Result, TxFlowError};

fn invalid(msg: impl Into<String>) -> TxFlowError {
    TxFlowError::InvalidTransaction(msg.into())
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for the transaction header.
///
/// ```rust,no_run
/// use txflow::crypto::Account;
/// use txflow::transaction::builder::TransactionBuilder;
/// use txflow::transaction::types::TxBody;
/// # fn demo(params: &txflow::transaction::NetworkParams) -> txflow::Result<()> {
/// let alice = Account::generate();
/// let bob = Account::generate();
/// let tx = TransactionBuilder::new(alice.address(), params)
///     .note(b"invoice 42".to_vec())
///     .build(TxBody::Payment {
///         receiver: bob.address(),
///         amount: 1_000_000,
///         close_remainder_to: None,
///     })?;
/// # Ok(()) }
/// ```
pub struct TransactionBuilder<'a> {
    sender: Address,
    params: &'a NetworkParams,
    note: Option<Vec<u8>>,
    lease: Option<Vec<u8>>,
    rekey_to: Option<Address>,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(sender: Address, params: &'a NetworkParams) -> Self {
        Self {
            sender,
            params,
            note: None,
            lease: None,
            rekey_to: None,
        }
    }

    pub fn note(mut self, note: Vec<u8>) -> Self {
        self.note = Some(note);
        self
    }

    pub fn maybe_note(mut self, note: Option<Vec<u8>>) -> Self {
        self.note = note;
        self
    }

    pub fn lease(mut self, lease: Option<Vec<u8>>) -> Self {
        self.lease = lease;
        self
    }

    pub fn rekey_to(mut self, rekey_to: Option<Address>) -> Self {
        self.rekey_to = rekey_to;
        self
    }

    /// Produces the unsigned transaction.
    ///
    /// Flat-fee params use `params.fee` as the total. Otherwise the fee is
    /// `params.fee` per byte of the estimated signed size, never below
    /// [`MIN_TX_FEE`].
    pub fn build(self, body: TxBody) -> Result<Transaction> {
        let lease = match self.lease {
            None => None,
            Some(bytes) => {
                let arr: [u8; LEASE_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
                    invalid(format!(
                        "lease must be {} bytes, got {}",
                        LEASE_LENGTH,
                        bytes.len()
                    ))
                })?;
                Some(arr)
            }
        };

        let mut tx = Transaction {
            sender: self.sender,
            fee: 0,
            first_valid: self.params.first_round,
            last_valid: self.params.last_round,
            genesis_id: self.params.genesis_id.clone(),
            genesis_hash: self.params.genesis_hash,
            note: self.note,
            lease,
            rekey_to: self.rekey_to,
            group: None,
            body,
        };

        tx.fee = if self.params.flat_fee {
            self.params.fee
        } else {
            // The fee is a fixed-width field, so its value does not change
            // the encoded size.
            let size = tx.canonical_bytes()?.len() as u64 + SIGNATURE_SIZE_OVERHEAD;
            let per_byte = self
                .params
                .fee
                .checked_mul(size)
                .ok_or_else(|| invalid("fee per byte overflows"))?;
            per_byte.max(MIN_TX_FEE)
        };

        Ok(tx)
    }
}

// ---------------------------------------------------------------------------
// ExecParams -> Transaction
// ---------------------------------------------------------------------------

/// Builds the unsigned transaction described by `exec`.
///
/// Notes follow [`resolve_note`] precedence; the asset definition's note
/// only participates for asset creation. Asset opt-ins never carry a note.
pub fn build_transaction(exec: &ExecParams, params: &NetworkParams) -> Result<Transaction> {
    let flags = &exec.pay_flags;

    if flags.close_remainder_to.is_some() && !matches!(exec.operation, Operation::Payment { .. }) {
        return Err(invalid("close_remainder_to only applies to payments"));
    }

    let asset_note = match &exec.operation {
        Operation::AssetCreate { definition } => {
            (definition.note.as_deref(), definition.note_b64.as_deref())
        }
        _ => (None, None),
    };

    let note = match exec.operation {
        Operation::AssetOptIn { .. } => None,
        _ => resolve_note(
            exec.note.as_deref(),
            exec.note_b64.as_deref(),
            asset_note.0,
            asset_note.1,
        )?,
    };

    let body = operation_body(exec)?;

    TransactionBuilder::new(exec.from, params)
        .maybe_note(note)
        .lease(flags.lease.clone())
        .rekey_to(flags.rekey_to)
        .build(body)
}

fn operation_body(exec: &ExecParams) -> Result<TxBody> {
    let sender = exec.from;

    match &exec.operation {
        Operation::Payment { to, amount } => {
            let close = exec.pay_flags.close_remainder_to;
            if close == Some(*to) {
                return Err(invalid("cannot close account to its receiver"));
            }
            if close == Some(sender) {
                return Err(invalid("cannot close account to its sender"));
            }
            Ok(TxBody::Payment {
                receiver: *to,
                amount: *amount,
                close_remainder_to: close,
            })
        }

        Operation::AssetTransfer {
            asset_id,
            to,
            amount,
            close_to,
        } => {
            require_asset_id(*asset_id)?;
            Ok(TxBody::AssetTransfer {
                asset_id: *asset_id,
                receiver: *to,
                amount: *amount,
                close_to: *close_to,
                revocation_target: None,
            })
        }

        Operation::AssetOptIn { asset_id } => {
            require_asset_id(*asset_id)?;
            Ok(TxBody::AssetTransfer {
                asset_id: *asset_id,
                receiver: sender,
                amount: 0,
                close_to: None,
                revocation_target: None,
            })
        }

        Operation::AssetCreate { definition } => Ok(TxBody::AssetConfig {
            asset_id: 0,
            params: Some(asset_params(definition)?),
        }),

        Operation::AssetConfig {
            asset_id,
            manager,
            reserve,
            freeze,
            clawback,
        } => {
            require_asset_id(*asset_id)?;
            Ok(TxBody::AssetConfig {
                asset_id: *asset_id,
                params: Some(AssetParams {
                    total: 0,
                    decimals: 0,
                    default_frozen: false,
                    unit_name: String::new(),
                    asset_name: String::new(),
                    url: String::new(),
                    metadata_hash: None,
                    manager: *manager,
                    reserve: *reserve,
                    freeze: *freeze,
                    clawback: *clawback,
                }),
            })
        }

        Operation::AssetFreeze {
            asset_id,
            target,
            frozen,
        } => {
            require_asset_id(*asset_id)?;
            Ok(TxBody::AssetFreeze {
                asset_id: *asset_id,
                target: *target,
                frozen: *frozen,
            })
        }

        Operation::AssetRevoke {
            asset_id,
            revocation_target,
            to,
            amount,
        } => {
            require_asset_id(*asset_id)?;
            Ok(TxBody::AssetTransfer {
                asset_id: *asset_id,
                receiver: *to,
                amount: *amount,
                close_to: None,
                revocation_target: Some(*revocation_target),
            })
        }

        Operation::AssetDestroy { asset_id } => {
            require_asset_id(*asset_id)?;
            Ok(TxBody::AssetConfig {
                asset_id: *asset_id,
                params: None,
            })
        }

        Operation::ApplicationCall(call) => app_call_body(call),
    }
}

fn require_asset_id(asset_id: u64) -> Result<()> {
    if asset_id == 0 {
        return Err(invalid("asset id 0 does not refer to an existing asset"));
    }
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(invalid(format!(
            "{} is {} bytes, maximum is {}",
            field,
            value.len(),
            max
        )));
    }
    Ok(())
}

/// Validates an asset definition against protocol limits.
pub fn asset_params(def: &AssetDefinition) -> Result<AssetParams> {
    if def.total == 0 {
        return Err(invalid("asset total supply must be greater than 0"));
    }
    if def.decimals > MAX_ASSET_DECIMALS {
        return Err(invalid(format!(
            "asset decimals {} exceeds maximum of {}",
            def.decimals, MAX_ASSET_DECIMALS
        )));
    }
    check_len("unit name", &def.unit_name, MAX_UNIT_NAME_BYTES)?;
    check_len("asset name", &def.asset_name, MAX_ASSET_NAME_BYTES)?;
    check_len("asset url", &def.url, MAX_ASSET_URL_BYTES)?;

    let metadata_hash = match &def.metadata_hash {
        None => None,
        Some(bytes) => Some(
            <[u8; ASSET_METADATA_HASH_LENGTH]>::try_from(bytes.as_slice()).map_err(|_| {
                invalid(format!(
                    "metadata hash must be {} bytes, got {}",
                    ASSET_METADATA_HASH_LENGTH,
                    bytes.len()
                ))
            })?,
        ),
    };

    Ok(AssetParams {
        total: def.total,
        decimals: def.decimals,
        default_frozen: def.default_frozen,
        unit_name: def.unit_name.clone(),
        asset_name: def.asset_name.clone(),
        url: def.url.clone(),
        metadata_hash,
        manager: def.manager,
        reserve: def.reserve,
        freeze: def.freeze,
        clawback: def.clawback,
    })
}

fn app_call_body(call: &AppCall) -> Result<TxBody> {
    if call.args.len() > MAX_APP_ARGS {
        return Err(invalid(format!(
            "{} application args, maximum is {}",
            call.args.len(),
            MAX_APP_ARGS
        )));
    }
    let arg_bytes: usize = call.args.iter().map(Vec::len).sum();
    if arg_bytes > MAX_APP_TOTAL_ARG_BYTES {
        return Err(invalid(format!(
            "application args total {} bytes, maximum is {}",
            arg_bytes, MAX_APP_TOTAL_ARG_BYTES
        )));
    }
    if call.accounts.len() > MAX_APP_ACCOUNTS {
        return Err(invalid(format!(
            "{} application accounts, maximum is {}",
            call.accounts.len(),
            MAX_APP_ACCOUNTS
        )));
    }
    let refs = call.accounts.len() + call.foreign_apps.len() + call.foreign_assets.len();
    if refs > MAX_APP_TOTAL_REFERENCES {
        return Err(invalid(format!(
            "{} application references, maximum is {}",
            refs, MAX_APP_TOTAL_REFERENCES
        )));
    }

    let creating = call.app_id == 0;
    let updating = call.on_complete == OnComplete::Update;
    let has_programs = call.approval_program.is_some() || call.clear_program.is_some();

    if creating || updating {
        for (name, program) in [
            ("approval program", &call.approval_program),
            ("clear program", &call.clear_program),
        ] {
            match program {
                None => return Err(invalid(format!("{} is required", name))),
                Some(p) if p.is_empty() => return Err(invalid(format!("{} is empty", name))),
                Some(p) if p.len() > MAX_APP_PROGRAM_BYTES => {
                    return Err(invalid(format!(
                        "{} is {} bytes, maximum is {}",
                        name,
                        p.len(),
                        MAX_APP_PROGRAM_BYTES
                    )))
                }
                Some(_) => {}
            }
        }
    } else if has_programs {
        return Err(invalid("programs may only be set when creating or updating"));
    }

    if updating && creating {
        return Err(invalid("cannot update application 0"));
    }
    if !creating && (call.global_schema.is_some() || call.local_schema.is_some()) {
        return Err(invalid("state schemas may only be set at creation"));
    }

    Ok(TxBody::ApplicationCall {
        app_id: call.app_id,
        on_complete: call.on_complete,
        args: call.args.clone(),
        accounts: call.accounts.clone(),
        foreign_apps: call.foreign_apps.clone(),
        foreign_assets: call.foreign_assets.clone(),
        approval_program: call.approval_program.clone(),
        clear_program: call.clear_program.clone(),
        global_schema: call.global_schema,
        local_schema: call.local_schema,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Account;
    use crate::transaction::params::UserTxParams;
    use crate::transaction::types::StateSchema;

    fn flat_params() -> NetworkParams {
        NetworkParams {
            first_round: 500,
            last_round: 1_500,
            fee: 1_000,
            flat_fee: true,
            genesis_id: "devnet-v1".into(),
            genesis_hash: [5u8; 32],
        }
    }

    fn alice() -> Account {
        Account::from_seed(&[1u8; 32])
    }

    fn bob() -> Account {
        Account::from_seed(&[2u8; 32])
    }

    fn payment() -> ExecParams {
        ExecParams::secret_key(
            &alice(),
            Operation::Payment {
                to: bob().address(),
                amount: 1_000_000,
            },
        )
    }

    fn create(def: AssetDefinition) -> ExecParams {
        ExecParams::secret_key(&alice(), Operation::AssetCreate { definition: def })
    }

    #[test]
    fn building_twice_is_byte_identical() {
        let a = build_transaction(&payment(), &flat_params()).unwrap();
        let b = build_transaction(&payment(), &flat_params()).unwrap();
        assert_eq!(a.canonical_bytes().unwrap(), b.canonical_bytes().unwrap());
    }

    #[test]
    fn header_comes_from_params() {
        let tx = build_transaction(&payment(), &flat_params()).unwrap();
        assert_eq!(tx.sender, alice().address());
        assert_eq!(tx.fee, 1_000);
        assert_eq!(tx.first_valid, 500);
        assert_eq!(tx.last_valid, 1_500);
        assert_eq!(tx.genesis_id, "devnet-v1");
        assert!(tx.group.is_none());
    }

    #[test]
    fn per_byte_fee_scales_with_size() {
        let mut params = flat_params();
        params.flat_fee = false;
        params.fee = 10;

        let small = build_transaction(&payment(), &params).unwrap();
        let big = build_transaction(&payment().with_note(&[7u8; 500]), &params).unwrap();

        let size = small.canonical_bytes().unwrap().len() as u64 + SIGNATURE_SIZE_OVERHEAD;
        assert_eq!(small.fee, (10 * size).max(MIN_TX_FEE));
        assert!(big.fee > small.fee);
    }

    #[test]
    fn tiny_per_byte_fee_floors_at_minimum() {
        let mut params = flat_params();
        params.flat_fee = false;
        params.fee = 0;
        let tx = build_transaction(&payment(), &params).unwrap();
        assert_eq!(tx.fee, MIN_TX_FEE);
    }

    #[test]
    fn opt_in_is_zero_amount_self_transfer_without_note() {
        let exec = ExecParams::secret_key(&alice(), Operation::AssetOptIn { asset_id: 42 })
            .with_note(b"ignored");
        let tx = build_transaction(&exec, &flat_params()).unwrap();

        assert_eq!(tx.note, None);
        assert_eq!(
            tx.body,
            TxBody::AssetTransfer {
                asset_id: 42,
                receiver: alice().address(),
                amount: 0,
                close_to: None,
                revocation_target: None,
            }
        );
    }

    #[test]
    fn asset_create_carries_full_parameter_set() {
        let def = AssetDefinition {
            total: 1_000_000,
            decimals: 6,
            default_frozen: true,
            unit_name: "GOLD".into(),
            asset_name: "Gold Token".into(),
            url: "https://example.com/gold".into(),
            metadata_hash: Some(vec![8u8; 32]),
            manager: Some(alice().address()),
            reserve: Some(bob().address()),
            freeze: Some(alice().address()),
            clawback: Some(bob().address()),
            ..Default::default()
        };
        let tx = build_transaction(&create(def), &flat_params()).unwrap();

        let TxBody::AssetConfig { asset_id, params } = tx.body else {
            panic!("expected asset config body");
        };
        let params = params.unwrap();
        assert_eq!(asset_id, 0);
        assert_eq!(params.total, 1_000_000);
        assert_eq!(params.decimals, 6);
        assert!(params.default_frozen);
        assert_eq!(params.unit_name, "GOLD");
        assert_eq!(params.metadata_hash, Some([8u8; 32]));
        assert_eq!(params.reserve, Some(bob().address()));
    }

    #[test]
    fn asset_note_used_when_transaction_has_none() {
        let def = AssetDefinition {
            note: Some(b"asset level".to_vec()),
            ..AssetDefinition::new(10, 0, "T", "Test")
        };
        let tx = build_transaction(&create(def), &flat_params()).unwrap();
        assert_eq!(tx.note.as_deref(), Some(&b"asset level"[..]));
    }

    #[test]
    fn transaction_note_beats_asset_note() {
        let def = AssetDefinition {
            note: Some(b"asset level".to_vec()),
            ..AssetDefinition::new(10, 0, "T", "Test")
        };
        let tx = build_transaction(&create(def).with_note_b64("aGVsbG8="), &flat_params()).unwrap();
        assert_eq!(tx.note.as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn long_unit_name_rejected() {
        let def = AssetDefinition::new(10, 0, "TOOLONGUNIT", "Test");
        let err = build_transaction(&create(def), &flat_params()).unwrap_err();
        assert!(matches!(err, TxFlowError::InvalidTransaction(_)));
    }

    #[test]
    fn long_asset_name_rejected() {
        let def = AssetDefinition::new(10, 0, "T", &"n".repeat(MAX_ASSET_NAME_BYTES + 1));
        assert!(build_transaction(&create(def), &flat_params()).is_err());
    }

    #[test]
    fn long_url_rejected() {
        let def = AssetDefinition {
            url: "u".repeat(MAX_ASSET_URL_BYTES + 1),
            ..AssetDefinition::new(10, 0, "T", "Test")
        };
        assert!(build_transaction(&create(def), &flat_params()).is_err());
    }

    #[test]
    fn bad_metadata_hash_rejected() {
        let def = AssetDefinition {
            metadata_hash: Some(vec![1u8; 31]),
            ..AssetDefinition::new(10, 0, "T", "Test")
        };
        assert!(build_transaction(&create(def), &flat_params()).is_err());
    }

    #[test]
    fn zero_total_and_excess_decimals_rejected() {
        assert!(build_transaction(&create(AssetDefinition::new(0, 0, "T", "T")), &flat_params()).is_err());
        assert!(build_transaction(&create(AssetDefinition::new(1, 20, "T", "T")), &flat_params()).is_err());
    }

    #[test]
    fn wrong_length_lease_rejected() {
        let exec = payment().with_pay_flags(UserTxParams {
            lease: Some(vec![1u8; 16]),
            ..Default::default()
        });
        assert!(build_transaction(&exec, &flat_params()).is_err());
    }

    #[test]
    fn lease_and_rekey_carried_into_header() {
        let exec = payment().with_pay_flags(UserTxParams {
            lease: Some(vec![1u8; 32]),
            rekey_to: Some(bob().address()),
            ..Default::default()
        });
        let tx = build_transaction(&exec, &flat_params()).unwrap();
        assert_eq!(tx.lease, Some([1u8; 32]));
        assert_eq!(tx.rekey_to, Some(bob().address()));
    }

    #[test]
    fn close_remainder_to_receiver_rejected() {
        let exec = payment().with_pay_flags(UserTxParams {
            close_remainder_to: Some(bob().address()),
            ..Default::default()
        });
        assert!(build_transaction(&exec, &flat_params()).is_err());
    }

    #[test]
    fn close_remainder_to_on_asset_transfer_rejected() {
        let exec = ExecParams::secret_key(&alice(), Operation::AssetOptIn { asset_id: 3 })
            .with_pay_flags(UserTxParams {
                close_remainder_to: Some(bob().address()),
                ..Default::default()
            });
        assert!(build_transaction(&exec, &flat_params()).is_err());
    }

    #[test]
    fn revoke_sets_revocation_target() {
        let exec = ExecParams::secret_key(
            &alice(),
            Operation::AssetRevoke {
                asset_id: 7,
                revocation_target: bob().address(),
                to: alice().address(),
                amount: 5,
            },
        );
        let tx = build_transaction(&exec, &flat_params()).unwrap();
        assert!(matches!(
            tx.body,
            TxBody::AssetTransfer { revocation_target: Some(t), .. } if t == bob().address()
        ));
    }

    #[test]
    fn destroy_has_no_params() {
        let exec = ExecParams::secret_key(&alice(), Operation::AssetDestroy { asset_id: 7 });
        let tx = build_transaction(&exec, &flat_params()).unwrap();
        assert_eq!(
            tx.body,
            TxBody::AssetConfig {
                asset_id: 7,
                params: None
            }
        );
    }

    #[test]
    fn asset_id_zero_rejected_for_existing_asset_ops() {
        let exec = ExecParams::secret_key(&alice(), Operation::AssetOptIn { asset_id: 0 });
        assert!(build_transaction(&exec, &flat_params()).is_err());
    }

    #[test]
    fn app_create_requires_programs() {
        let call = AppCall {
            approval_program: Some(vec![1]),
            ..Default::default()
        };
        let exec = ExecParams::secret_key(&alice(), Operation::ApplicationCall(call));
        assert!(build_transaction(&exec, &flat_params()).is_err());
    }

    #[test]
    fn app_create_with_schemas_builds() {
        let call = AppCall {
            approval_program: Some(vec![0x06, 0x81, 0x01]),
            clear_program: Some(vec![0x06, 0x81, 0x01]),
            global_schema: Some(StateSchema {
                num_uints: 1,
                num_byte_slices: 1,
            }),
            ..Default::default()
        };
        let exec = ExecParams::secret_key(&alice(), Operation::ApplicationCall(call));
        let tx = build_transaction(&exec, &flat_params()).unwrap();
        assert!(matches!(tx.body, TxBody::ApplicationCall { app_id: 0, .. }));
    }

    #[test]
    fn app_call_rejects_programs_and_too_many_args() {
        let with_program = AppCall {
            app_id: 9,
            approval_program: Some(vec![1]),
            ..Default::default()
        };
        let exec = ExecParams::secret_key(&alice(), Operation::ApplicationCall(with_program));
        assert!(build_transaction(&exec, &flat_params()).is_err());

        let too_many_args = AppCall {
            app_id: 9,
            args: vec![vec![0u8]; MAX_APP_ARGS + 1],
            ..Default::default()
        };
        let exec = ExecParams::secret_key(&alice(), Operation::ApplicationCall(too_many_args));
        assert!(build_transaction(&exec, &flat_params()).is_err());
    }
}
