//! In-memory multisig contract
//!
//! Computes digests the way the deployed contract does:
//! `keccak256(abi.encodePacked(address(this), chainId, nonce, to, value, data))`,
//! recovering signers from personal-message signatures.

use crate::contract::MultisigContract;
use crate::crypto::{keccak256, recover_signer};
use crate::mock::lock;
use crate::rpc::RpcError;
use alloy_primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Address the local deployment puts the multisig at
pub const HARDHAT_MULTISIG: Address = address!("56d13eb21a625eda8438f55df2c31dc3632034f5");

/// First default development account
pub const HARDHAT_OWNER: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

#[derive(Debug)]
pub struct SimulatedMultisig {
    address: Address,
    chain_id: Mutex<u64>,
    nonce: Mutex<U256>,
    signatures_required: Mutex<U256>,
    owners: Mutex<HashSet<Address>>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
}

impl SimulatedMultisig {
    pub fn new(address: Address, chain_id: u64, owners: &[Address], signatures_required: u64) -> Self {
        Self {
            address,
            chain_id: Mutex::new(chain_id),
            nonce: Mutex::new(U256::ZERO),
            signatures_required: Mutex::new(U256::from(signatures_required)),
            owners: Mutex::new(owners.iter().copied().collect()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 1-of-1 wallet on the local chain owned by the first development account
    pub fn hardhat() -> Self {
        Self::new(HARDHAT_MULTISIG, 31337, &[HARDHAT_OWNER], 1)
    }

    pub fn set_nonce(&self, nonce: U256) {
        *lock(&self.nonce) = nonce;
    }

    pub fn set_chain_id(&self, chain_id: u64) {
        *lock(&self.chain_id) = chain_id;
    }

    pub fn set_signatures_required(&self, required: u64) {
        *lock(&self.signatures_required) = U256::from(required);
    }

    pub fn add_owner(&self, owner: Address) {
        lock(&self.owners).insert(owner);
    }

    /// Make calls to `method` fail like a reverted `eth_call`
    pub fn fail_on(&self, method: &'static str) {
        lock(&self.failing).insert(method);
    }

    /// Contract methods called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    /// Digest the contract would compute, without recording a call
    pub fn transaction_hash(&self, nonce: U256, to: Address, value: U256, data: &[u8]) -> B256 {
        let chain_id = U256::from(*lock(&self.chain_id));

        let mut packed = Vec::with_capacity(20 + 32 * 3 + 20 + data.len());
        packed.extend_from_slice(self.address.as_slice());
        packed.extend_from_slice(&chain_id.to_be_bytes::<32>());
        packed.extend_from_slice(&nonce.to_be_bytes::<32>());
        packed.extend_from_slice(to.as_slice());
        packed.extend_from_slice(&value.to_be_bytes::<32>());
        packed.extend_from_slice(data);
        keccak256(&packed)
    }

    fn enter(&self, method: &'static str) -> Result<(), RpcError> {
        lock(&self.calls).push(method);
        if lock(&self.failing).contains(method) {
            return Err(RpcError::Execution(method.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MultisigContract for SimulatedMultisig {
    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        self.enter("chainId")?;
        Ok(*lock(&self.chain_id))
    }

    async fn nonce(&self) -> Result<U256, RpcError> {
        self.enter("nonce")?;
        Ok(*lock(&self.nonce))
    }

    async fn signatures_required(&self) -> Result<U256, RpcError> {
        self.enter("signaturesRequired")?;
        Ok(*lock(&self.signatures_required))
    }

    async fn is_owner(&self, account: Address) -> Result<bool, RpcError> {
        self.enter("isOwner")?;
        Ok(lock(&self.owners).contains(&account))
    }

    async fn get_transaction_hash(
        &self,
        nonce: U256,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> Result<B256, RpcError> {
        self.enter("getTransactionHash")?;
        Ok(self.transaction_hash(nonce, to, value, &data))
    }

    async fn recover(&self, digest: B256, signature: Bytes) -> Result<Address, RpcError> {
        self.enter("recover")?;
        recover_signer(&digest, &signature).map_err(|e| RpcError::Execution(e.to_string()))
    }
}
