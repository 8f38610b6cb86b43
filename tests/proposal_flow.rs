//! End-to-end proposal and withdrawal scenarios against the in-memory doubles

use alloy_primitives::{address, b256, Address, Bytes, B256, U256};
use restake_multisig::core::{
    AdminAction, CompletedWithdrawal, Draft, DraftMethod, Notice, QueuedWithdrawal,
};
use restake_multisig::crypto::recover_signer;
use restake_multisig::mock::{
    RecordingStore, RejectingSigner, SimulatedChain, SimulatedMultisig, HARDHAT_OWNER,
};
use restake_multisig::multisig::{
    LocalSigner, ProposalError, ProposalOutcome, ProposalPipeline, ProposalSigner,
    ProposalSubmitter, NOT_OWNER,
};
use restake_multisig::storage::DraftStore;
use restake_multisig::withdrawal::{Readiness, WithdrawalGate};
use std::sync::Arc;
use std::time::Duration;

const HARDHAT_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const HARDHAT_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const OPERATOR_DELEGATOR: Address = address!("e70f935c32da4db13e7876795f1e175465e6458e");
const RECIPIENT: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

fn pipeline_with(
    multisig: Arc<SimulatedMultisig>,
    signer: ProposalSigner,
    submitter: ProposalSubmitter,
) -> ProposalPipeline {
    ProposalPipeline::new(multisig, signer, submitter, OPERATOR_DELEGATOR, 31337)
}

fn local(key: &str) -> ProposalSigner {
    ProposalSigner::new(Arc::new(LocalSigner::from_private_key_hex(key).unwrap()))
}

#[tokio::test]
async fn test_undelegate_proposal_matches_contract_digest() {
    let multisig = Arc::new(SimulatedMultisig::hardhat());
    multisig.set_nonce(U256::from(5));
    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        multisig.clone(),
        local(HARDHAT_0),
        ProposalSubmitter::new(store.clone()),
    );

    let notice = pipeline.run(&AdminAction::Undelegate).await;
    assert!(matches!(notice, Notice::Success(_)));

    let submitted = store.submissions();
    assert_eq!(submitted.len(), 1);
    let proposal = &submitted[0];
    assert_eq!(
        proposal.digest(),
        b256!("bbcb9b8cd183308e9e9d612fee4637f74e5f14fbd6a78fe211c32152d0f922bb")
    );
    assert_eq!(proposal.data(), &Bytes::from(vec![0x92, 0xab, 0x89, 0xbb]));
    assert_eq!(proposal.signers(), &[HARDHAT_OWNER]);

    // Signature is a personal-message signature over the digest
    let recovered = recover_signer(&proposal.digest(), &proposal.signatures()[0]).unwrap();
    assert_eq!(recovered, HARDHAT_OWNER);
}

#[tokio::test]
async fn test_transfer_amount_stays_exact() {
    let multisig = Arc::new(SimulatedMultisig::hardhat());
    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        multisig,
        local(HARDHAT_0),
        ProposalSubmitter::new(store.clone()),
    );

    let draft = Draft {
        method_name: DraftMethod::TransferFunds,
        signer: RECIPIENT.to_string(),
        amount: "1000000000000000000".to_string(),
        ..Default::default()
    };
    pipeline.propose(&draft.to_action().unwrap()).await.unwrap();

    let proposal = &store.submissions()[0];
    assert_eq!(
        proposal.digest(),
        b256!("686a09c37f8a2fb37948eb739dd666b821fd6cec90adedf398a565268176f06d")
    );

    let json: serde_json::Value = serde_json::from_slice(&proposal.to_json().unwrap()).unwrap();
    assert_eq!(json["amount"], "1000000000000000000");
    assert_eq!(json["data"], "0x");
}

#[tokio::test]
async fn test_non_owner_never_reaches_store() {
    let multisig = Arc::new(SimulatedMultisig::hardhat());
    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        multisig,
        local(HARDHAT_1),
        ProposalSubmitter::new(store.clone()),
    );

    let outcome = pipeline.propose(&AdminAction::QueueWithdrawal).await.unwrap();
    assert!(matches!(outcome, ProposalOutcome::NotOwner { recovered } if recovered == RECIPIENT));
    assert_eq!(outcome.notice(), Notice::Info(NOT_OWNER.to_string()));
    assert!(store.submissions().is_empty());
}

#[tokio::test]
async fn test_chain_mismatch_is_refused() {
    let multisig = Arc::new(SimulatedMultisig::hardhat());
    multisig.set_chain_id(1);
    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        multisig.clone(),
        local(HARDHAT_0),
        ProposalSubmitter::new(store.clone()),
    );

    let result = pipeline.propose(&AdminAction::Undelegate).await;
    assert!(matches!(
        result,
        Err(ProposalError::ChainMismatch { configured: 31337, contract: 1 })
    ));
    assert!(!multisig.calls().contains(&"getTransactionHash"));
    assert!(store.submissions().is_empty());
}

#[tokio::test]
async fn test_rejected_signature_is_an_error_notice() {
    let multisig = Arc::new(SimulatedMultisig::hardhat());
    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        multisig,
        ProposalSigner::new(Arc::new(RejectingSigner)),
        ProposalSubmitter::new(store.clone()),
    );

    let notice = pipeline.run(&AdminAction::Undelegate).await;
    assert_eq!(
        notice,
        Notice::Error("Error while proposing transaction".to_string())
    );
    assert!(store.submissions().is_empty());
}

#[tokio::test]
async fn test_store_failure_keeps_draft_and_success_clears_it() {
    let temp_dir = tempfile::tempdir().unwrap();
    let drafts = DraftStore::new(temp_dir.path());
    let mut draft = Draft {
        method_name: DraftMethod::AddSigner,
        signer: RECIPIENT.to_string(),
        new_signatures_number: "2".to_string(),
        ..Default::default()
    };
    drafts.save(&mut draft).unwrap();
    let saved = drafts.load().unwrap();

    let failing = pipeline_with(
        Arc::new(SimulatedMultisig::hardhat()),
        local(HARDHAT_0),
        ProposalSubmitter::new(Arc::new(RecordingStore::failing(502))).with_drafts(drafts.clone()),
    );
    let result = failing.propose_draft(&saved).await;
    assert!(matches!(result, Err(ProposalError::Store(_))));
    assert_eq!(drafts.load().unwrap().signer, RECIPIENT.to_string());

    let store = Arc::new(RecordingStore::new());
    let working = pipeline_with(
        Arc::new(SimulatedMultisig::hardhat()),
        local(HARDHAT_0),
        ProposalSubmitter::new(store.clone()).with_drafts(drafts.clone()),
    );
    working.propose_draft(&saved).await.unwrap();
    assert_eq!(store.submissions().len(), 1);
    assert!(drafts.load().unwrap().is_empty());
}

fn queued(nonce: u64, start_block: u64) -> QueuedWithdrawal {
    QueuedWithdrawal {
        withdraw_root: B256::repeat_byte(nonce as u8),
        staker: OPERATOR_DELEGATOR,
        delegated_to: address!("1111111111111111111111111111111111111111"),
        withdrawer: OPERATOR_DELEGATOR,
        nonce: U256::from(nonce),
        start_block: U256::from(start_block),
        strategies: vec![address!("2222222222222222222222222222222222222222")],
        shares: vec![U256::from(10u64).pow(U256::from(18))],
    }
}

#[tokio::test]
async fn test_withdrawal_becomes_ready_then_completes() {
    let chain = Arc::new(SimulatedChain::new(1099, 100));
    chain.queue(queued(5, 1000));
    let gate = WithdrawalGate::new(chain.clone(), chain.clone(), chain.clone(), 0);

    let report = gate.evaluate().await;
    assert_eq!(report.get(U256::from(5)).unwrap().readiness, Readiness::Queued);
    assert!(matches!(
        report.completion(U256::from(5)),
        Err(ProposalError::NotReady(_))
    ));

    chain.set_height(1100);
    let report = gate.evaluate().await;
    assert_eq!(report.get(U256::from(5)).unwrap().readiness, Readiness::Ready);

    // The completion proposal goes through the regular pipeline
    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        Arc::new(SimulatedMultisig::hardhat()),
        local(HARDHAT_0),
        ProposalSubmitter::new(store.clone()),
    );
    let action = report.completion(U256::from(5)).unwrap();
    pipeline.propose(&action).await.unwrap();
    assert_eq!(store.submissions()[0].to(), OPERATOR_DELEGATOR);

    chain.complete(CompletedWithdrawal {
        withdrawal_root: B256::repeat_byte(5),
        nonce: U256::from(5),
    });
    for height in [1099, 1100, 5000] {
        chain.set_height(height);
        assert!(gate.evaluate().await.entries.is_empty());
    }
}

#[tokio::test]
async fn test_watcher_follows_new_blocks() {
    let chain = Arc::new(SimulatedChain::new(1099, 100));
    chain.queue(queued(5, 1000));
    let gate = Arc::new(WithdrawalGate::new(
        chain.clone(),
        chain.clone(),
        chain.clone(),
        0,
    ));

    let (mut reports, handle) = gate.watch(Duration::from_millis(10)).await;
    assert_eq!(
        reports.borrow().get(U256::from(5)).unwrap().readiness,
        Readiness::Queued
    );

    chain.set_height(1100);
    tokio::time::timeout(Duration::from_secs(2), reports.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        reports.borrow().get(U256::from(5)).unwrap().readiness,
        Readiness::Ready
    );

    handle.abort();
}

#[tokio::test]
async fn test_added_owner_proposes_with_raised_threshold() {
    let multisig = Arc::new(SimulatedMultisig::hardhat());
    multisig.add_owner(RECIPIENT);
    multisig.set_signatures_required(2);
    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        multisig,
        local(HARDHAT_1),
        ProposalSubmitter::new(store.clone()),
    );

    let outcome = pipeline.propose(&AdminAction::Undelegate).await.unwrap();
    assert!(matches!(outcome, ProposalOutcome::Submitted(_)));

    let proposal = &store.submissions()[0];
    assert_eq!(proposal.signers(), &[RECIPIENT]);
    assert_eq!(proposal.required_approvals(), U256::from(2));
}

#[tokio::test]
async fn test_undelegate_keeps_saved_draft() {
    let temp_dir = tempfile::tempdir().unwrap();
    let drafts = DraftStore::new(temp_dir.path());
    let mut draft = Draft {
        method_name: DraftMethod::TransferFunds,
        signer: RECIPIENT.to_string(),
        amount: "7".to_string(),
        ..Default::default()
    };
    drafts.save(&mut draft).unwrap();

    let store = Arc::new(RecordingStore::new());
    let pipeline = pipeline_with(
        Arc::new(SimulatedMultisig::hardhat()),
        local(HARDHAT_0),
        ProposalSubmitter::new(store.clone()).with_drafts(drafts.clone()),
    );
    pipeline.propose(&AdminAction::Undelegate).await.unwrap();

    assert_eq!(store.submissions().len(), 1);
    assert_eq!(drafts.load().unwrap().amount, "7");
}

#[tokio::test]
async fn test_longer_delay_pushes_readiness_back() {
    let chain = Arc::new(SimulatedChain::new(1100, 100));
    chain.queue(queued(5, 1000));
    let gate = WithdrawalGate::new(chain.clone(), chain.clone(), chain.clone(), 0);
    assert_eq!(
        gate.evaluate().await.get(U256::from(5)).unwrap().readiness,
        Readiness::Ready
    );

    chain.set_delay(U256::from(101));
    let report = gate.evaluate().await;
    assert_eq!(report.delay, Some(U256::from(101)));
    assert_eq!(report.get(U256::from(5)).unwrap().readiness, Readiness::Queued);
}
