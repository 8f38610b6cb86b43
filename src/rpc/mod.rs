//! Ethereum JSON-RPC adapter
//!
//! Implements the capability traits of [`crate::contract`] against a node
//! through an alloy HTTP provider: contract reads, event history and write
//! transactions.

pub mod adapter;
pub mod error;

pub use adapter::{EthRpc, RpcDelegationManager, RpcMultisig, RpcOperatorDelegator, RpcRestakeManager};
pub use error::RpcError;
