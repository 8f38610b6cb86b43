//! In-memory restake manager, tokens and transaction sender

use crate::contract::abi::IERC20;
use crate::contract::{RestakeManager, TokenReader, TransactionSender};
use crate::core::TxReceipt;
use crate::crypto::keccak256;
use crate::mock::lock;
use crate::rpc::RpcError;
use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Vault contracts sharing one ledger of sent transactions
///
/// Approvals sent through it update the recorded allowance; mint and
/// withdraw previews are 1:1.
#[derive(Debug, Default)]
pub struct SimulatedVault {
    allowances: Mutex<HashMap<Address, U256>>,
    balances: Mutex<HashMap<(Address, Address), U256>>,
    sent: Mutex<Vec<(Address, Bytes)>>,
    receipts: Mutex<HashMap<B256, TxReceipt>>,
    fail_allowance: AtomicBool,
    revert_next: AtomicBool,
}

impl SimulatedVault {
    pub const MANAGER: Address = address!("e8addd62fed354203d079926a8e563bc1a7fe81e");
    pub const STETH: Address = address!("3f1c547b21f65e10480de3ad8e19faac46c95034");
    pub const YETH: Address = address!("071586ba1b380b00b793cc336fe01106b0bfbe6d");
    pub const ACCOUNT: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

    pub fn new() -> Self {
        Self::default()
    }

    /// Allowance `ACCOUNT` has granted the manager on `token`
    pub fn set_allowance(&self, token: Address, amount: U256) {
        lock(&self.allowances).insert(token, amount);
    }

    pub fn set_balance(&self, token: Address, account: Address, amount: U256) {
        lock(&self.balances).insert((token, account), amount);
    }

    pub fn fail_allowance(&self, fail: bool) {
        self.fail_allowance.store(fail, Ordering::SeqCst);
    }

    /// Make the next transaction revert
    pub fn revert_next(&self, revert: bool) {
        self.revert_next.store(revert, Ordering::SeqCst);
    }

    /// Transactions sent so far as `(to, data)`
    pub fn sent(&self) -> Vec<(Address, Bytes)> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl RestakeManager for SimulatedVault {
    fn address(&self) -> Address {
        Self::MANAGER
    }

    async fn mint_amount(&self, amount: U256) -> Result<U256, RpcError> {
        Ok(amount)
    }

    async fn withdraw_amount(&self, amount: U256) -> Result<U256, RpcError> {
        Ok(amount)
    }
}

#[async_trait]
impl TokenReader for SimulatedVault {
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256, RpcError> {
        Ok(lock(&self.balances)
            .get(&(token, account))
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(
        &self,
        token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, RpcError> {
        if self.fail_allowance.load(Ordering::SeqCst) {
            return Err(RpcError::Unavailable("allowance".to_string()));
        }
        Ok(lock(&self.allowances)
            .get(&token)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TransactionSender for SimulatedVault {
    async fn send_transaction(
        &self,
        _from: Address,
        to: Address,
        data: Bytes,
    ) -> Result<B256, RpcError> {
        let index = {
            let mut sent = lock(&self.sent);
            sent.push((to, data.clone()));
            sent.len() as u64 - 1
        };

        let reverted = self.revert_next.swap(false, Ordering::SeqCst);
        if !reverted {
            if let Ok(approve) = IERC20::approveCall::abi_decode(&data, true) {
                lock(&self.allowances).insert(to, approve.amount);
            }
        }

        let hash = keccak256(&index.to_be_bytes());
        lock(&self.receipts).insert(
            hash,
            TxReceipt {
                transaction_hash: hash,
                block_number: Some(index + 1),
                status: !reverted,
            },
        );
        Ok(hash)
    }

    async fn wait_for_receipt(&self, hash: B256) -> Result<TxReceipt, RpcError> {
        lock(&self.receipts)
            .get(&hash)
            .cloned()
            .ok_or_else(|| RpcError::Unavailable(format!("unknown transaction {}", hash)))
    }
}
