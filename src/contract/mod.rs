//! Contract interfaces
//!
//! # Overview
//!
//! This module implements:
//! - Solidity declarations of the multisig, the OperatorDelegator, the
//!   delegation manager, the restake manager and ERC-20 tokens
//! - Typed capability traits the rest of the crate programs against

pub mod abi;
pub mod capabilities;

pub use abi::{IDelegationManager, IOperatorDelegator, IRestakeManager, ISafeMultiSigWallet, IERC20};
pub use capabilities::{
    ChainReader, DelegationManager, MultisigContract, OperatorDelegator, RestakeManager,
    TokenReader, TransactionSender, WithdrawalEventSource,
};
