//! Transaction digests as the multisig computes them
//!
//! The digest is always obtained from the contract's own
//! `getTransactionHash`, never hashed locally, so a signature collected here
//! is exactly what the contract will verify at execution time.

use crate::contract::MultisigContract;
use crate::core::ProposalCall;
use crate::rpc::RpcError;
use alloy_primitives::{B256, U256};
use std::sync::Arc;

/// A digest together with the nonce and call it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDigest {
    pub nonce: U256,
    pub call: ProposalCall,
    pub digest: B256,
}

/// Computes transaction digests through the multisig contract
pub struct DigestBuilder {
    multisig: Arc<dyn MultisigContract>,
}

impl DigestBuilder {
    pub fn new(multisig: Arc<dyn MultisigContract>) -> Self {
        Self { multisig }
    }

    /// Digest of `call` at the contract's current nonce
    ///
    /// The nonce is read fresh right before the digest call; a cached nonce
    /// would produce a proposal for an already executed slot.
    pub async fn build(&self, call: ProposalCall) -> Result<PreparedDigest, RpcError> {
        let nonce = self.multisig.nonce().await?;
        self.build_at(nonce, call).await
    }

    /// Digest of `call` at an explicit nonce
    pub async fn build_at(&self, nonce: U256, call: ProposalCall) -> Result<PreparedDigest, RpcError> {
        let digest = self
            .multisig
            .get_transaction_hash(nonce, call.to, call.value, call.data.clone())
            .await?;

        log::debug!("Digest {} for nonce {} -> {}", digest, nonce, call.to);

        Ok(PreparedDigest {
            nonce,
            call,
            digest,
        })
    }
}
