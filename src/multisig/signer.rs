//! Owner signatures over transaction digests
//!
//! Signing, recovery and the owner check are strictly sequential: the
//! recovered address is what the contract says signed, and only that address
//! is checked for membership.

use crate::contract::MultisigContract;
use crate::crypto::{KeyError, KeyPair};
use crate::multisig::error::ProposalError;
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the connected signer
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Signature request rejected: {0}")]
    Rejected(String),
    #[error("Signer did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// Something that can produce a personal-message signature
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Account the signatures belong to
    fn address(&self) -> Address;

    /// Sign the 32 raw digest bytes as a personal message
    async fn sign_digest(&self, digest: B256) -> Result<Bytes, SignerError>;
}

/// Signer backed by a key held in process
pub struct LocalSigner {
    key: KeyPair,
}

impl LocalSigner {
    pub fn new(key: KeyPair) -> Self {
        Self { key }
    }

    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, SignerError> {
        Ok(Self::new(KeyPair::from_private_key_hex(hex_key)?))
    }
}

#[async_trait]
impl MessageSigner for LocalSigner {
    fn address(&self) -> Address {
        self.key.address()
    }

    async fn sign_digest(&self, digest: B256) -> Result<Bytes, SignerError> {
        Ok(self.key.sign_message(&digest)?)
    }
}

/// A digest signature and the address the contract recovered from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDigest {
    pub digest: B256,
    pub signature: Bytes,
    pub signer: Address,
}

/// Outcome of the owner check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Owner(SignedDigest),
    /// The recovered signer is not an owner; nothing may be submitted
    NotOwner { recovered: Address },
}

/// Signs digests and verifies the signer against the multisig
pub struct ProposalSigner {
    signer: Arc<dyn MessageSigner>,
    timeout: Option<Duration>,
}

impl ProposalSigner {
    pub fn new(signer: Arc<dyn MessageSigner>) -> Self {
        Self {
            signer,
            timeout: None,
        }
    }

    /// Bound how long to wait for the signer
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Request a signature from the connected signer
    pub async fn sign(&self, digest: B256) -> Result<Bytes, SignerError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.signer.sign_digest(digest))
                .await
                .map_err(|_| SignerError::Timeout(limit))?,
            None => self.signer.sign_digest(digest).await,
        }
    }

    /// Sign `digest`, recover the signer through the contract and check it
    /// is an owner
    pub async fn sign_and_verify(
        &self,
        multisig: &dyn MultisigContract,
        digest: B256,
    ) -> Result<Verification, ProposalError> {
        let signature = self.sign(digest).await?;
        let recovered = multisig.recover(digest, signature.clone()).await?;

        if !multisig.is_owner(recovered).await? {
            log::warn!("Recovered signer {} is not an owner", recovered);
            return Ok(Verification::NotOwner { recovered });
        }

        Ok(Verification::Owner(SignedDigest {
            digest,
            signature,
            signer: recovered,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::recover_signer;
    use crate::mock::{SimulatedMultisig, StallingSigner};
    use alloy_primitives::b256;

    const HARDHAT_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DIGEST: B256 =
        b256!("686a09c37f8a2fb37948eb739dd666b821fd6cec90adedf398a565268176f06d");

    #[tokio::test]
    async fn test_local_signer_recovers_to_own_address() {
        let signer = LocalSigner::from_private_key_hex(HARDHAT_0).unwrap();
        let signature = signer.sign_digest(DIGEST).await.unwrap();

        assert_eq!(signature.len(), 65);
        assert!(signature[64] == 27 || signature[64] == 28);
        assert_eq!(recover_signer(&DIGEST, &signature).unwrap(), signer.address());
    }

    #[tokio::test]
    async fn test_owner_is_verified() {
        let multisig = SimulatedMultisig::hardhat();
        let signer = ProposalSigner::new(Arc::new(
            LocalSigner::from_private_key_hex(HARDHAT_0).unwrap(),
        ));

        match signer.sign_and_verify(&multisig, DIGEST).await.unwrap() {
            Verification::Owner(signed) => {
                assert_eq!(signed.signer, signer.address());
                assert_eq!(signed.digest, DIGEST);
            }
            other => panic!("expected owner, got {:?}", other),
        }
        assert_eq!(multisig.calls(), vec!["recover", "isOwner"]);
    }

    #[tokio::test]
    async fn test_non_owner_is_recognised() {
        let multisig = SimulatedMultisig::hardhat();
        let outsider = LocalSigner::new(KeyPair::generate());
        let expected = outsider.address();
        let signer = ProposalSigner::new(Arc::new(outsider));

        let verification = signer.sign_and_verify(&multisig, DIGEST).await.unwrap();
        assert_eq!(verification, Verification::NotOwner { recovered: expected });
    }

    #[tokio::test]
    async fn test_timeout_bounds_signing() {
        let multisig = SimulatedMultisig::hardhat();
        let signer = ProposalSigner::new(Arc::new(StallingSigner::new()))
            .with_timeout(Duration::from_millis(20));

        let result = signer.sign_and_verify(&multisig, DIGEST).await;
        assert!(matches!(
            result,
            Err(ProposalError::Signer(SignerError::Timeout(_)))
        ));
        assert!(multisig.calls().is_empty());
    }
}
