//! Cryptographic utilities
//!
//! This module provides:
//! - Keccak-256 hashing and the personal-message envelope
//! - ECDSA key management (secp256k1) with signer recovery

pub mod hash;
pub mod keys;

pub use hash::{eth_message_hash, keccak256, keccak256_hex, selector, ETH_MESSAGE_PREFIX};
pub use keys::{
    public_key_to_address, recover_signer, sign_message, KeyError, KeyPair, SIGNATURE_LENGTH,
};
