//! ECDSA key management for proposal signing
//!
//! Provides key pair generation, Ethereum address derivation, personal-message
//! signing and signer recovery on the secp256k1 curve.

use alloy_primitives::{Address, Bytes, B256};
use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::hash::{eth_message_hash, keccak256};

/// Length of an `r || s || v` signature
pub const SIGNATURE_LENGTH: usize = 65;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid signature length: {0} bytes")]
    InvalidSignatureLength(usize),
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key (with or without `0x`)
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let trimmed = hex_key.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a `0x`-prefixed hex string
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret_key.secret_bytes()))
    }

    /// Ethereum address of this key
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte digest as a personal message
    pub fn sign_message(&self, digest: &B256) -> Result<Bytes, KeyError> {
        sign_message(&self.secret_key, digest)
    }
}

/// Convert a public key to an Ethereum address
///
/// The address is the last 20 bytes of the Keccak-256 of the uncompressed
/// point without its `0x04` tag.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Sign a digest wrapped in the personal-message envelope
///
/// Output is 65 bytes `r || s || v` with `v` in `{27, 28}`.
pub fn sign_message(secret_key: &SecretKey, digest: &B256) -> Result<Bytes, KeyError> {
    let secp = Secp256k1::new();
    let hash = eth_message_hash(digest);
    let message = Message::from_digest_slice(hash.as_slice())?;

    let signature = secp.sign_ecdsa_recoverable(&message, secret_key);
    let (recovery_id, compact) = signature.serialize_compact();

    let mut out = Vec::with_capacity(SIGNATURE_LENGTH);
    out.extend_from_slice(&compact);
    out.push(27 + recovery_id.to_i32() as u8);
    Ok(Bytes::from(out))
}

/// Recover the address that signed `digest` as a personal message
///
/// Accepts `v` as either `{27, 28}` or `{0, 1}`.
pub fn recover_signer(digest: &B256, signature: &[u8]) -> Result<Address, KeyError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(KeyError::InvalidSignatureLength(signature.len()));
    }

    let v = signature[64];
    let recovery = match v {
        27 | 28 => v - 27,
        0 | 1 => v,
        other => return Err(KeyError::InvalidRecoveryId(other)),
    };

    let recovery_id = RecoveryId::from_i32(recovery as i32)?;
    let sig = RecoverableSignature::from_compact(&signature[..64], recovery_id)?;

    let secp = Secp256k1::new();
    let hash = eth_message_hash(digest);
    let message = Message::from_digest_slice(hash.as_slice())?;
    let public_key = secp.recover_ecdsa(&message, &sig)?;

    Ok(public_key_to_address(&public_key))
}
