//! Recording proposal store and misbehaving signers

use crate::core::Proposal;
use crate::mock::lock;
use crate::multisig::{MessageSigner, ProposalStore, SignerError, StoreError};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::sync::Mutex;

/// Proposal store that keeps every submission in memory
#[derive(Debug, Default)]
pub struct RecordingStore {
    submissions: Mutex<Vec<Proposal>>,
    reject_with: Option<u16>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that answers every submission with HTTP `status`
    pub fn failing(status: u16) -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
            reject_with: Some(status),
        }
    }

    /// Accepted submissions, in order
    pub fn submissions(&self) -> Vec<Proposal> {
        lock(&self.submissions).clone()
    }
}

#[async_trait]
impl ProposalStore for RecordingStore {
    fn location(&self) -> String {
        "memory://pool".to_string()
    }

    async fn submit(&self, proposal: &Proposal) -> Result<(), StoreError> {
        if let Some(status) = self.reject_with {
            return Err(StoreError::Rejected {
                status,
                body: "unavailable".to_string(),
            });
        }
        lock(&self.submissions).push(proposal.clone());
        Ok(())
    }
}

/// Signer that never answers
#[derive(Debug, Default)]
pub struct StallingSigner;

impl StallingSigner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageSigner for StallingSigner {
    fn address(&self) -> Address {
        Address::ZERO
    }

    async fn sign_digest(&self, _digest: B256) -> Result<Bytes, SignerError> {
        futures::future::pending().await
    }
}

/// Signer whose user declines every request
#[derive(Debug, Default)]
pub struct RejectingSigner;

#[async_trait]
impl MessageSigner for RejectingSigner {
    fn address(&self) -> Address {
        Address::ZERO
    }

    async fn sign_digest(&self, _digest: B256) -> Result<Bytes, SignerError> {
        Err(SignerError::Rejected("User rejected the request".to_string()))
    }
}
