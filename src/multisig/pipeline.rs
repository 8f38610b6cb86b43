//! The propose flow: action to digest to signature to store
//!
//! Every step is awaited in order. A second request for an action that is
//! still being proposed is refused before any RPC call is made.

use crate::contract::MultisigContract;
use crate::core::{
    ActionTargets, AdminAction, Draft, ErrorKind, Notice, Proposal, UnsignedProposal,
};
use crate::multisig::digest::DigestBuilder;
use crate::multisig::error::ProposalError;
use crate::multisig::signer::{ProposalSigner, Verification};
use crate::multisig::submitter::ProposalSubmitter;
use alloy_primitives::Address;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Notice shown when the recovered signer is not an owner
pub const NOT_OWNER: &str = "Only owners can propose transactions";

/// Result of a propose request that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalOutcome {
    Submitted(Proposal),
    /// Nothing was submitted
    NotOwner { recovered: Address },
}

impl ProposalOutcome {
    pub fn notice(&self) -> Notice {
        match self {
            ProposalOutcome::Submitted(p) => {
                Notice::Success(format!("Proposed transaction #{} ({})", p.nonce(), p.digest()))
            }
            ProposalOutcome::NotOwner { .. } => Notice::Info(NOT_OWNER.to_string()),
        }
    }
}

/// Actions currently being proposed
#[derive(Debug, Default, Clone)]
struct InFlight {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    fn acquire(&self, key: String) -> Result<InFlightGuard, ProposalError> {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        if !keys.insert(key.clone()) {
            return Err(ProposalError::InFlight(key));
        }
        Ok(InFlightGuard {
            keys: self.keys.clone(),
            key,
        })
    }
}

/// Releases the action when dropped, including on cancellation
struct InFlightGuard {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut keys = self.keys.lock().unwrap_or_else(|e| e.into_inner());
        keys.remove(&self.key);
    }
}

/// Runs administrative actions through the multisig proposal protocol
pub struct ProposalPipeline {
    multisig: Arc<dyn MultisigContract>,
    digests: DigestBuilder,
    signer: ProposalSigner,
    submitter: ProposalSubmitter,
    targets: ActionTargets,
    chain_id: u64,
    in_flight: InFlight,
}

impl ProposalPipeline {
    pub fn new(
        multisig: Arc<dyn MultisigContract>,
        signer: ProposalSigner,
        submitter: ProposalSubmitter,
        operator_delegator: Address,
        chain_id: u64,
    ) -> Self {
        let targets = ActionTargets {
            multisig: multisig.address(),
            operator_delegator,
        };
        Self {
            digests: DigestBuilder::new(multisig.clone()),
            multisig,
            signer,
            submitter,
            targets,
            chain_id,
            in_flight: InFlight::default(),
        }
    }

    pub fn targets(&self) -> ActionTargets {
        self.targets
    }

    pub fn store_location(&self) -> String {
        self.submitter.location()
    }

    /// Propose `action` on behalf of the connected signer
    ///
    /// The saved draft is left untouched.
    pub async fn propose(&self, action: &AdminAction) -> Result<ProposalOutcome, ProposalError> {
        self.propose_action(action, false).await
    }

    /// Propose the action described by `draft`, clearing the saved draft once
    /// the store accepted it
    pub async fn propose_draft(&self, draft: &Draft) -> Result<ProposalOutcome, ProposalError> {
        let action = draft.to_action()?;
        self.propose_action(&action, true).await
    }

    async fn propose_action(
        &self,
        action: &AdminAction,
        from_draft: bool,
    ) -> Result<ProposalOutcome, ProposalError> {
        let _guard = self.in_flight.acquire(action.key())?;
        log::info!("Proposing {}", action.name());

        let call = action.to_call(&self.targets);

        let (contract_chain, required_approvals) = futures::try_join!(
            self.multisig.chain_id(),
            self.multisig.signatures_required()
        )?;
        if contract_chain != self.chain_id {
            return Err(ProposalError::ChainMismatch {
                configured: self.chain_id,
                contract: contract_chain,
            });
        }

        let prepared = self.digests.build(call).await?;

        let signed = match self
            .signer
            .sign_and_verify(self.multisig.as_ref(), prepared.digest)
            .await?
        {
            Verification::Owner(signed) => signed,
            Verification::NotOwner { recovered } => {
                return Ok(ProposalOutcome::NotOwner { recovered })
            }
        };

        let proposal = UnsignedProposal {
            chain_id: self.chain_id,
            contract_address: self.targets.multisig,
            nonce: prepared.nonce,
            call: prepared.call,
            digest: prepared.digest,
            required_approvals,
        }
        .sign_off(signed.signature, signed.signer);

        if from_draft {
            self.submitter.submit_draft(&proposal).await?;
        } else {
            self.submitter.submit(&proposal).await?;
        }

        Ok(ProposalOutcome::Submitted(proposal))
    }

    /// Propose `action` and reduce the result to the notice shown to the user
    pub async fn run(&self, action: &AdminAction) -> Notice {
        match self.propose(action).await {
            Ok(outcome) => outcome.notice(),
            Err(e) => {
                match e.kind() {
                    ErrorKind::Transport => {
                        log::error!("{} failed: {}", action.name(), e)
                    }
                    _ => log::warn!("{} refused: {}", action.name(), e),
                }
                e.notice()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{RecordingStore, SimulatedMultisig, StallingSigner};
    use crate::multisig::signer::LocalSigner;
    use alloy_primitives::{address, U256};

    const HARDHAT_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OPERATOR_DELEGATOR: Address = address!("e70f935c32da4db13e7876795f1e175465e6458e");

    fn pipeline(
        multisig: Arc<SimulatedMultisig>,
        store: Arc<RecordingStore>,
    ) -> ProposalPipeline {
        let signer = ProposalSigner::new(Arc::new(
            LocalSigner::from_private_key_hex(HARDHAT_0).unwrap(),
        ));
        ProposalPipeline::new(
            multisig,
            signer,
            ProposalSubmitter::new(store),
            OPERATOR_DELEGATOR,
            31337,
        )
    }

    #[tokio::test]
    async fn test_owner_proposal_is_submitted() {
        let multisig = Arc::new(SimulatedMultisig::hardhat());
        multisig.set_nonce(U256::from(5));
        let store = Arc::new(RecordingStore::new());

        let outcome = pipeline(multisig.clone(), store.clone())
            .propose(&AdminAction::Undelegate)
            .await
            .unwrap();

        let submitted = store.submissions();
        assert_eq!(submitted.len(), 1);
        assert_eq!(outcome, ProposalOutcome::Submitted(submitted[0].clone()));
        assert_eq!(submitted[0].nonce(), U256::from(5));
        assert_eq!(submitted[0].to(), OPERATOR_DELEGATOR);
        assert_eq!(submitted[0].signatures().len(), 1);
    }

    #[tokio::test]
    async fn test_guard_released_after_completion() {
        let multisig = Arc::new(SimulatedMultisig::hardhat());
        let store = Arc::new(RecordingStore::new());
        let pipeline = pipeline(multisig, store.clone());

        pipeline.propose(&AdminAction::QueueWithdrawal).await.unwrap();
        pipeline.propose(&AdminAction::QueueWithdrawal).await.unwrap();
        assert_eq!(store.submissions().len(), 2);
    }

    #[tokio::test]
    async fn test_second_request_rejected_while_in_flight() {
        let multisig = Arc::new(SimulatedMultisig::hardhat());
        let store = Arc::new(RecordingStore::new());
        let signer = ProposalSigner::new(Arc::new(StallingSigner::new()))
            .with_timeout(std::time::Duration::from_millis(100));
        let pipeline = ProposalPipeline::new(
            multisig.clone(),
            signer,
            ProposalSubmitter::new(store.clone()),
            OPERATOR_DELEGATOR,
            31337,
        );

        let (first, second) = tokio::join!(
            pipeline.propose(&AdminAction::Undelegate),
            async {
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                pipeline.propose(&AdminAction::Undelegate).await
            }
        );

        assert!(matches!(first, Err(ProposalError::Signer(_))));
        assert!(matches!(second, Err(ProposalError::InFlight(ref k)) if k == "undelegate"));
        assert!(store.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_run_maps_outcomes_to_notices() {
        let multisig = Arc::new(SimulatedMultisig::hardhat());
        let store = Arc::new(RecordingStore::failing(500));
        let notice = pipeline(multisig, store)
            .run(&AdminAction::Undelegate)
            .await;
        assert_eq!(notice, Notice::Error("Error while proposing transaction".to_string()));
    }

    fn saved_draft(dir: &std::path::Path) -> crate::storage::DraftStore {
        let drafts = crate::storage::DraftStore::new(dir);
        let mut draft = Draft {
            signer: "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".to_string(),
            amount: "5".to_string(),
            ..Default::default()
        };
        drafts.save(&mut draft).unwrap();
        drafts
    }

    #[tokio::test]
    async fn test_unrelated_action_keeps_saved_draft() {
        let temp_dir = tempfile::tempdir().unwrap();
        let drafts = saved_draft(temp_dir.path());
        let store = Arc::new(RecordingStore::new());
        let signer = ProposalSigner::new(Arc::new(
            LocalSigner::from_private_key_hex(HARDHAT_0).unwrap(),
        ));
        let pipeline = ProposalPipeline::new(
            Arc::new(SimulatedMultisig::hardhat()),
            signer,
            ProposalSubmitter::new(store.clone()).with_drafts(drafts.clone()),
            OPERATOR_DELEGATOR,
            31337,
        );

        pipeline.propose(&AdminAction::Undelegate).await.unwrap();
        assert_eq!(store.submissions().len(), 1);
        assert_eq!(drafts.load().unwrap().amount, "5");

        let draft = drafts.load().unwrap();
        pipeline.propose_draft(&draft).await.unwrap();
        assert_eq!(store.submissions().len(), 2);
        assert!(drafts.load().unwrap().is_empty());
    }
}
