//! Typed capability interfaces of the on-chain collaborators
//!
//! The proposal pipeline, the withdrawal gate and the vault actions only see
//! these traits. The JSON-RPC adapter in [`crate::rpc`] implements them
//! against a node; [`crate::mock`] implements them in memory.

use crate::core::{CompletedWithdrawal, QueuedWithdrawal, TxReceipt};
use crate::rpc::RpcError;
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

/// The multisig wallet
///
/// Digest computation, signer recovery and owner membership are always asked
/// of the contract itself so the client can never disagree with it.
#[async_trait]
pub trait MultisigContract: Send + Sync {
    fn address(&self) -> Address;

    /// Chain id the contract was deployed with
    async fn chain_id(&self) -> Result<u64, RpcError>;

    async fn nonce(&self) -> Result<U256, RpcError>;

    async fn signatures_required(&self) -> Result<U256, RpcError>;

    async fn is_owner(&self, account: Address) -> Result<bool, RpcError>;

    async fn get_transaction_hash(
        &self,
        nonce: U256,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> Result<B256, RpcError>;

    async fn recover(&self, digest: B256, signature: Bytes) -> Result<Address, RpcError>;
}

/// Historical withdrawal events
#[async_trait]
pub trait WithdrawalEventSource: Send + Sync {
    async fn withdrawals_queued(&self, from_block: u64) -> Result<Vec<QueuedWithdrawal>, RpcError>;

    async fn withdrawals_completed(
        &self,
        from_block: u64,
    ) -> Result<Vec<CompletedWithdrawal>, RpcError>;
}

/// The vault's delegation module
#[async_trait]
pub trait OperatorDelegator: WithdrawalEventSource {
    fn address(&self) -> Address;

    /// Operator the vault currently delegates to
    async fn operator(&self) -> Result<Address, RpcError>;
}

/// The restaking protocol's delegation manager
#[async_trait]
pub trait DelegationManager: Send + Sync {
    async fn min_withdrawal_delay_blocks(&self) -> Result<U256, RpcError>;
}

#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn block_number(&self) -> Result<u64, RpcError>;
}

/// ERC-20 reads
#[async_trait]
pub trait TokenReader: Send + Sync {
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, RpcError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, RpcError>;
}

/// Write transactions sent from the connected account
#[async_trait]
pub trait TransactionSender: Send + Sync {
    async fn send_transaction(&self, from: Address, to: Address, data: Bytes)
        -> Result<B256, RpcError>;

    /// Resolves once the transaction is mined
    async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt, RpcError>;
}

/// The vault's deposit/withdraw entry point
#[async_trait]
pub trait RestakeManager: Send + Sync {
    fn address(&self) -> Address;

    /// yETH minted for a stETH deposit
    async fn mint_amount(&self, amount: U256) -> Result<U256, RpcError>;

    /// stETH returned for burning yETH
    async fn withdraw_amount(&self, amount: U256) -> Result<U256, RpcError>;
}
