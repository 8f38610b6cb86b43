//! Restake-Multisig: an off-chain proposal client for a multisig treasury
//!
//! The treasury administers a liquid-restaking vault. This crate provides:
//! - Multisig digest computation, owner signing and proposal submission
//!   to the off-chain pool server
//! - A withdrawal readiness gate over the vault's queued withdrawals
//! - Vault deposits and withdrawals with automatic token approval
//! - JSON-RPC adapters for the contracts, with in-memory doubles behind the
//!   `test-util` feature
//! - JSON persistence of configuration and the saved action draft
//!
//! # Example
//!
//! ```ignore
//! use restake_multisig::core::AdminAction;
//! use restake_multisig::multisig::{LocalSigner, ProposalPipeline, ProposalSigner};
//!
//! let signer = ProposalSigner::new(Arc::new(LocalSigner::from_private_key_hex(key)?));
//! let pipeline = ProposalPipeline::new(multisig, signer, submitter, operator_delegator, 31337);
//!
//! // Exactly one notice per action
//! println!("{}", pipeline.run(&AdminAction::Undelegate).await);
//! ```

pub mod cli;
pub mod contract;
pub mod core;
pub mod crypto;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod multisig;
pub mod rpc;
pub mod storage;
pub mod vault;
pub mod withdrawal;

// Re-export commonly used types
pub use core::{AdminAction, Draft, Notice, Proposal, ProposalCall};
pub use crypto::KeyPair;
pub use multisig::{
    DigestBuilder, ProposalError, ProposalPipeline, ProposalSigner, ProposalSubmitter,
};
pub use rpc::{EthRpc, RpcError};
pub use storage::{AppConfig, DraftStore};
pub use vault::{Vault, VaultError};
pub use withdrawal::{GateReport, Readiness, WithdrawalGate};
