//! Keccak-256 hashing utilities
//!
//! Ethereum hashes everything with Keccak-256: addresses, function selectors,
//! event topics and the personal-message envelope wallets sign.

use alloy_primitives::B256;

/// EIP-191 prefix for a 32-byte personal message
pub const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Computes Keccak-256 of the input data
pub fn keccak256(data: &[u8]) -> B256 {
    alloy_primitives::keccak256(data)
}

/// Computes Keccak-256 and returns it as a hex string (no prefix)
pub fn keccak256_hex(data: &[u8]) -> String {
    hex::encode(keccak256(data))
}

/// Hash of a raw 32-byte digest wrapped in the personal-message envelope.
///
/// This is what a wallet actually signs when asked to sign `{ raw: digest }`,
/// and what the multisig's `recover` unwraps before `ecrecover`.
pub fn eth_message_hash(digest: &B256) -> B256 {
    let mut buf = Vec::with_capacity(ETH_MESSAGE_PREFIX.len() + 32);
    buf.extend_from_slice(ETH_MESSAGE_PREFIX);
    buf.extend_from_slice(digest.as_slice());
    keccak256(&buf)
}

/// First four bytes of the Keccak-256 of a canonical function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            keccak256_hex(b""),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_selector() {
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("undelegate()"), [0x92, 0xab, 0x89, 0xbb]);
    }

    #[test]
    fn test_eth_message_hash_wraps_digest() {
        let digest = keccak256(b"proposal");
        let wrapped = eth_message_hash(&digest);
        assert_ne!(wrapped, digest);
        // Envelope is deterministic
        assert_eq!(wrapped, eth_message_hash(&digest));
    }
}
