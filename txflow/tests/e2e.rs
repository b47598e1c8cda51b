//! End-to-end tests for the orchestration pipeline.
//!
//! Every test drives a [`SubmissionExecutor`] or [`SignedBlobReplayer`]
//! against its own [`LocalLedger`], which checks signatures, logic
//! signatures, group ids and validity windows exactly where a node would.
//! No shared state between tests.

use std::sync::Arc;

use txflow::crypto::keys::{Account, Address};
use txflow::network::{LocalLedger, LocalLedgerConfig};
use txflow::transaction::signing::decode_signed_blob;
use txflow::transaction::{
    AssetDefinition, ExecParams, LogicSig, Operation, SignType, TxBody, UserTxParams,
};
use txflow::{
    write_signed_blob, ExecRequest, ExecutorConfig, SignedBlobReplayer, SubmissionExecutor,
    TxFlowError,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn setup() -> (Arc<LocalLedger>, SubmissionExecutor<LocalLedger>) {
    let ledger = Arc::new(LocalLedger::new(LocalLedgerConfig::default()));
    let executor = SubmissionExecutor::new(Arc::clone(&ledger), ExecutorConfig::default());
    (ledger, executor)
}

fn pay(from: &Account, to: Address, amount: u64) -> ExecParams {
    ExecParams::secret_key(from, Operation::Payment { to, amount })
}

/// Approves everything. Program evaluation is the node's business.
fn approve_all() -> Vec<u8> {
    vec![0x06, 0x81, 0x01]
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payment_with_custom_window_and_flat_fee() {
    let (ledger, executor) = setup();
    let alice = Account::generate();
    let bob = Account::generate();

    let exec = pay(&alice, bob.address(), 1_000_000)
        .with_note(b"rent, march")
        .with_pay_flags(UserTxParams::default().with_window(500, 1_000).with_total_fee(2_500));

    let blobs = executor
        .sign_only(ExecRequest::Single(exec.clone()))
        .await
        .unwrap();
    let stx = decode_signed_blob(&blobs[0]).unwrap();
    assert_eq!(stx.txn.first_valid, 500);
    assert_eq!(stx.txn.last_valid, 1_500);
    assert_eq!(stx.txn.fee, 2_500);
    assert_eq!(stx.txn.note.as_deref(), Some(&b"rent, march"[..]));
    assert!(stx.txn.group.is_none());

    let result = executor.execute_one(exec).await.unwrap();
    assert_eq!(result.txid, Some(stx.txid().unwrap()));
    assert_eq!(result.confirmed_round, ledger.config().start_round + 1);
    assert_eq!(ledger.params_fetches(), 2);
    assert_eq!(ledger.submissions(), 1);
}

#[tokio::test]
async fn per_byte_fee_never_drops_below_minimum() {
    let (_ledger, executor) = setup();
    let alice = Account::generate();

    let exec = pay(&alice, Address::ZERO, 1)
        .with_pay_flags(UserTxParams::default().with_fee_per_byte(1));
    let blobs = executor.sign_only(exec.into()).await.unwrap();
    let fee = decode_signed_blob(&blobs[0]).unwrap().txn.fee;
    assert!(fee >= txflow::config::MIN_TX_FEE);
}

// ---------------------------------------------------------------------------
// Atomic Groups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mixed_secret_key_and_logic_sig_group_confirms() {
    let (ledger, executor) = setup();
    let alice = Account::generate();
    let bob = Account::generate();
    let carol = Account::generate();

    let escrow = LogicSig::new(approve_all(), vec![b"claim".to_vec()]);
    let delegated = LogicSig::new(approve_all(), vec![]).delegate(&carol);

    let execs = vec![
        pay(&alice, escrow.address(), 5_000),
        ExecParams::logic_sig(
            escrow.address(),
            escrow.clone(),
            Operation::Payment {
                to: bob.address(),
                amount: 4_000,
            },
        ),
        ExecParams::logic_sig(
            carol.address(),
            delegated,
            Operation::Payment {
                to: bob.address(),
                amount: 10,
            },
        ),
    ];

    let blobs = executor.sign_only(execs.clone().into()).await.unwrap();
    let stxns: Vec<_> = blobs.iter().map(|b| decode_signed_blob(b).unwrap()).collect();

    let gid = stxns[0].txn.group.expect("group id assigned");
    assert!(stxns.iter().all(|s| s.txn.group == Some(gid)));
    assert!(stxns[0].sig.is_some() && stxns[0].lsig.is_none());
    assert!(stxns[1].sig.is_none() && stxns[1].lsig.as_ref() == Some(&escrow));
    assert!(stxns[2].lsig.as_ref().is_some_and(LogicSig::is_delegated));

    let result = executor.execute_group(execs).await.unwrap();
    assert_eq!(result.txid, Some(stxns[0].txid().unwrap()));
    for stx in &stxns {
        assert!(ledger.confirmed(&stx.txid().unwrap()).is_some());
    }
    assert_eq!(ledger.submissions(), 1);
}

#[tokio::test]
async fn seventeen_entries_fail_without_touching_the_network() {
    let (ledger, executor) = setup();
    let alice = Account::generate();
    let execs = (0..17).map(|i| pay(&alice, Address::ZERO, i)).collect();

    let err = executor.execute_group(execs).await.unwrap_err();
    assert!(matches!(
        err,
        TxFlowError::GroupSizeExceeded { size: 17, max: 16 }
    ));
    assert_eq!(ledger.params_fetches(), 0);
    assert_eq!(ledger.submissions(), 0);
}

#[tokio::test]
async fn sixteen_entries_is_a_valid_group() {
    let (ledger, executor) = setup();
    let alice = Account::generate();
    let execs = (0..16).map(|i| pay(&alice, Address::ZERO, i)).collect();

    assert!(executor.execute_group(execs).await.is_ok());
    assert_eq!(ledger.submissions(), 1);
}

#[tokio::test]
async fn one_entry_group_is_submitted_ungrouped() {
    let (ledger, executor) = setup();
    let alice = Account::generate();
    let request = ExecRequest::Group(vec![pay(&alice, Address::ZERO, 9)]);

    let blobs = executor.sign_only(request.clone()).await.unwrap();
    let stx = decode_signed_blob(&blobs[0]).unwrap();
    assert!(stx.txn.group.is_none());

    let result = executor.execute(request).await.unwrap();
    assert_eq!(result.txid, Some(stx.txid().unwrap()));
    assert!(ledger.confirmed(&stx.txid().unwrap()).is_some());
}

#[tokio::test]
async fn wrong_program_logic_sig_never_reaches_the_network() {
    let (ledger, executor) = setup();
    let escrow = LogicSig::new(approve_all(), vec![]);
    let other = LogicSig::new(vec![0x06, 0x81, 0x00], vec![]);

    let exec = ExecParams::logic_sig(
        other.address(),
        escrow,
        Operation::Payment {
            to: Address::ZERO,
            amount: 1,
        },
    );
    let err = executor.execute_one(exec).await.unwrap_err();
    assert!(matches!(err, TxFlowError::LogicSigRejected(_)));
    assert_eq!(ledger.submissions(), 0);
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_opt_in_and_transfer_an_asset() {
    let (_ledger, executor) = setup();
    let issuer = Account::generate();
    let holder = Account::generate();

    let definition = AssetDefinition {
        note: Some(b"initial issuance".to_vec()),
        manager: Some(issuer.address()),
        ..AssetDefinition::new(1_000_000, 2, "GLD", "Gold")
    };
    let created = executor
        .execute_one(ExecParams::secret_key(
            &issuer,
            Operation::AssetCreate { definition },
        ))
        .await
        .unwrap();
    let asset_id = created.asset_index.expect("asset index assigned");

    let opt_in = ExecParams::secret_key(&holder, Operation::AssetOptIn { asset_id })
        .with_note(b"dropped for opt-ins");
    let blobs = executor.sign_only(opt_in.clone().into()).await.unwrap();
    let stx = decode_signed_blob(&blobs[0]).unwrap();
    assert!(stx.txn.note.is_none());
    assert_eq!(
        stx.txn.body,
        TxBody::AssetTransfer {
            asset_id,
            receiver: holder.address(),
            amount: 0,
            close_to: None,
            revocation_target: None,
        }
    );

    let transfer = ExecParams::secret_key(
        &issuer,
        Operation::AssetTransfer {
            asset_id,
            to: holder.address(),
            amount: 250,
            close_to: None,
        },
    );
    let result = executor.execute_group(vec![opt_in, transfer]).await.unwrap();
    assert!(result.is_confirmed());
}

#[tokio::test]
async fn invalid_asset_definition_fails_before_submit() {
    let (ledger, executor) = setup();
    let exec = ExecParams::secret_key(
        &Account::generate(),
        Operation::AssetCreate {
            definition: AssetDefinition::new(10, 0, "WAYTOOLONG", "Bad"),
        },
    );

    let err = executor.execute_one(exec).await.unwrap_err();
    assert!(matches!(err, TxFlowError::InvalidTransaction(_)));
    assert_eq!(ledger.submissions(), 0);
}

// ---------------------------------------------------------------------------
// Failure Modes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stalled_network_is_stale() {
    let (ledger, executor) = setup();
    ledger.set_stalled(true);

    let err = executor
        .execute_one(pay(&Account::generate(), Address::ZERO, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, TxFlowError::StaleNetwork));
    assert_eq!(ledger.submissions(), 0);
}

#[tokio::test]
async fn confirmation_wait_gives_up_after_wait_rounds() {
    let ledger = Arc::new(LocalLedger::new(LocalLedgerConfig::default()));
    ledger.hold_pending(true);
    let executor = SubmissionExecutor::new(
        Arc::clone(&ledger),
        ExecutorConfig::default().with_wait_rounds(2),
    );

    let err = executor
        .execute_one(pay(&Account::generate(), Address::ZERO, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TxFlowError::ConfirmationTimeout { rounds: 2, .. }
    ));
    assert_eq!(ledger.submissions(), 1);
}

#[tokio::test]
async fn pool_rejection_is_reported() {
    let (ledger, executor) = setup();
    ledger.drop_from_pool(Some("overspend".into()));

    let err = executor
        .execute_one(pay(&Account::generate(), Address::ZERO, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, TxFlowError::Rejected { .. }));
}

#[test]
fn unknown_sign_type_cannot_be_parsed() {
    assert!(matches!(
        "multisig".parse::<SignType>(),
        Err(TxFlowError::UnknownSignType(_))
    ));
    assert!(matches!(
        SignType::try_from(2u8),
        Err(TxFlowError::UnknownSignType(_))
    ));
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replay_signed_blob_from_disk() {
    let (ledger, executor) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payment.stx");

    let blobs = executor
        .sign_only(pay(&Account::generate(), Address::ZERO, 77).into())
        .await
        .unwrap();
    write_signed_blob(&path, &blobs[0]).await.unwrap();
    let txid = decode_signed_blob(&blobs[0]).unwrap().txid().unwrap();

    let replayer = SignedBlobReplayer::new(Arc::clone(&ledger), ExecutorConfig::default());
    let result = replayer.replay(&path).await.unwrap();
    assert_eq!(result.txid, Some(txid));
    assert_eq!(ledger.submissions(), 1);
}

#[tokio::test]
async fn replay_group_from_disk() {
    let (ledger, executor) = setup();
    let dir = tempfile::tempdir().unwrap();
    let alice = Account::generate();
    let bob = Account::generate();

    let blobs = executor
        .sign_only(vec![pay(&alice, bob.address(), 1), pay(&bob, alice.address(), 1)].into())
        .await
        .unwrap();
    let mut paths = Vec::new();
    for (i, blob) in blobs.iter().enumerate() {
        let path = dir.path().join(format!("member-{}.stx", i));
        write_signed_blob(&path, blob).await.unwrap();
        paths.push(path);
    }

    let replayer = SignedBlobReplayer::new(Arc::clone(&ledger), ExecutorConfig::default());
    assert!(replayer.replay_group(&paths).await.unwrap().is_confirmed());
}

#[tokio::test]
async fn replay_of_missing_file_is_file_not_found() {
    let (ledger, _executor) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never-written.stx");

    let replayer = SignedBlobReplayer::new(Arc::clone(&ledger), ExecutorConfig::default());
    let err = replayer.replay(&path).await.unwrap_err();
    assert!(matches!(err, TxFlowError::FileNotFound(ref p) if *p == path));
    assert_eq!(ledger.submissions(), 0);
}
