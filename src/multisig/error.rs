//! Failures of the proposal pipeline

use crate::core::{DraftError, ErrorKind, Notice, WithdrawalError};
use crate::multisig::signer::SignerError;
use crate::multisig::submitter::StoreError;
use crate::rpc::RpcError;
use alloy_primitives::U256;
use thiserror::Error;

/// Notice shown for any transport failure while proposing
pub const PROPOSE_FAILED: &str = "Error while proposing transaction";
/// Notice shown when a dependency has not loaded
pub const LOADING: &str = "Loading resources...";

/// Errors related to proposing a multisig transaction
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("No signing key configured")]
    NoWallet,
    #[error("Invalid {0} address")]
    InvalidAddress(&'static str),
    #[error("Invalid draft: {0}")]
    Draft(#[from] DraftError),
    #[error("Withdrawal error: {0}")]
    Withdrawal(#[from] WithdrawalError),
    #[error("Configured chain {configured} does not match the contract's chain {contract}")]
    ChainMismatch { configured: u64, contract: u64 },
    #[error("Withdrawal {0} is not ready to complete")]
    NotReady(U256),
    #[error("Loading resources...")]
    Loading,
    #[error("{0} is already in progress")]
    InFlight(String),
    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ProposalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProposalError::Loading => ErrorKind::Loading,
            ProposalError::Signer(_) | ProposalError::Rpc(_) | ProposalError::Store(_) => {
                ErrorKind::Transport
            }
            _ => ErrorKind::Precondition,
        }
    }

    /// The single notice this failure ends in
    pub fn notice(&self) -> Notice {
        match self.kind() {
            ErrorKind::Transport => Notice::for_failure(ErrorKind::Transport, PROPOSE_FAILED),
            ErrorKind::Loading => Notice::for_failure(ErrorKind::Loading, LOADING),
            ErrorKind::Precondition => Notice::for_failure(ErrorKind::Precondition, self.to_string()),
        }
    }
}
