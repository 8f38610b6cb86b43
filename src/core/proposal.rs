//! Proposals exchanged with the off-chain pool server
//!
//! A proposal bundles the raw call, the digest the multisig computed for it,
//! and the owner signatures collected so far. The pool server merges further
//! signatures on the same `(address, nonce, hash)` key; this client only ever
//! creates a proposal carrying exactly one signature.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// The raw call a proposal authorizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalCall {
    /// Target contract or recipient
    pub to: Address,
    /// Native value forwarded with the call, in wei
    pub value: U256,
    /// ABI-encoded calldata (empty for plain transfers)
    pub data: Bytes,
}

impl ProposalCall {
    /// A call carrying no native value
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: data.into(),
        }
    }

    /// A plain value transfer with empty calldata
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to,
            value,
            data: Bytes::new(),
        }
    }
}

/// Everything a proposal needs except the owner's signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedProposal {
    pub chain_id: u64,
    pub contract_address: Address,
    pub nonce: U256,
    pub call: ProposalCall,
    pub digest: B256,
    pub required_approvals: U256,
}

impl UnsignedProposal {
    /// Attach the first signature, producing the record sent to the store
    pub fn sign_off(self, signature: Bytes, signer: Address) -> Proposal {
        Proposal {
            chain_id: self.chain_id,
            contract_address: self.contract_address,
            nonce: self.nonce,
            to: self.call.to,
            value: self.call.value,
            data: self.call.data,
            digest: self.digest,
            signatures: vec![signature],
            signers: vec![signer],
            required_approvals: self.required_approvals,
        }
    }
}

/// A signed proposal as the pool server sees it
///
/// Fields are read-only: once built, a proposal is never edited. A new nonce
/// or digest means a new proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    chain_id: u64,
    #[serde(rename = "address")]
    contract_address: Address,
    #[serde(with = "decimal")]
    nonce: U256,
    to: Address,
    #[serde(rename = "amount", with = "decimal")]
    value: U256,
    data: Bytes,
    #[serde(rename = "hash")]
    digest: B256,
    signatures: Vec<Bytes>,
    signers: Vec<Address>,
    #[serde(with = "decimal")]
    required_approvals: U256,
}

impl Proposal {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    pub fn to(&self) -> Address {
        self.to
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn digest(&self) -> B256 {
        self.digest
    }

    pub fn signatures(&self) -> &[Bytes] {
        &self.signatures
    }

    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    pub fn required_approvals(&self) -> U256 {
        self.required_approvals
    }

    /// JSON body for submission
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Serde adapter writing `U256` as a decimal string
///
/// Wide integers must survive JavaScript consumers, which lose precision on
/// numbers above 2^53. Deserialization also accepts plain JSON numbers and
/// `0x` hex strings.
pub mod decimal {
    use alloy_primitives::U256;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text
                .trim()
                .parse::<U256>()
                .map_err(|e| D::Error::custom(format!("invalid integer {text:?}: {e}"))),
            Repr::Number(n) => Ok(U256::from(n)),
        }
    }
}
