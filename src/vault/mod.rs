//! User deposits into and withdrawals from the restaking vault
//!
//! Amounts are entered in ether units. The restake manager pulls tokens with
//! `transferFrom`, so an approval is sent first whenever the current
//! allowance does not cover the amount.

use crate::contract::abi::{IRestakeManager, IERC20};
use crate::contract::{RestakeManager, TokenReader, TransactionSender};
use crate::core::{ErrorKind, Notice, TxReceipt};
use crate::rpc::RpcError;
use alloy_primitives::utils::{format_ether, parse_ether};
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Deposit or withdraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultOperation {
    Deposit,
    Withdraw,
}

impl fmt::Display for VaultOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultOperation::Deposit => write!(f, "deposit"),
            VaultOperation::Withdraw => write!(f, "withdraw"),
        }
    }
}

/// Errors raised by vault actions
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("No signing key configured")]
    NoWallet,
    #[error("Invalid {0} amount")]
    InvalidAmount(VaultOperation),
    #[error("Loading resources...")]
    Loading(#[source] RpcError),
    #[error("Transaction {0} reverted")]
    Reverted(B256),
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::NoWallet | VaultError::InvalidAmount(_) => ErrorKind::Precondition,
            VaultError::Loading(_) => ErrorKind::Loading,
            VaultError::Reverted(_) | VaultError::Rpc(_) => ErrorKind::Transport,
        }
    }

    pub fn notice(&self, operation: VaultOperation) -> Notice {
        match self.kind() {
            ErrorKind::Transport => {
                let verb = match operation {
                    VaultOperation::Deposit => "depositing",
                    VaultOperation::Withdraw => "withdrawing",
                };
                Notice::Error(format!("Error {}", verb))
            }
            kind => Notice::for_failure(kind, self.to_string()),
        }
    }
}

/// Receipts of a completed vault action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultReceipt {
    pub amount: U256,
    /// Present when an approval had to be sent first
    pub approval: Option<TxReceipt>,
    pub receipt: TxReceipt,
}

/// Parse a positive ether-denominated amount into wei
pub fn parse_amount(text: &str, operation: VaultOperation) -> Result<U256, VaultError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('-') {
        return Err(VaultError::InvalidAmount(operation));
    }
    match parse_ether(text) {
        Ok(amount) if !amount.is_zero() => Ok(amount),
        _ => Err(VaultError::InvalidAmount(operation)),
    }
}

/// Deposit and withdraw on behalf of one account
pub struct Vault {
    manager: Arc<dyn RestakeManager>,
    tokens: Arc<dyn TokenReader>,
    sender: Arc<dyn TransactionSender>,
    steth: Address,
    yeth: Address,
    account: Address,
}

impl Vault {
    pub fn new(
        manager: Arc<dyn RestakeManager>,
        tokens: Arc<dyn TokenReader>,
        sender: Arc<dyn TransactionSender>,
        steth: Address,
        yeth: Address,
        account: Address,
    ) -> Self {
        Self {
            manager,
            tokens,
            sender,
            steth,
            yeth,
            account,
        }
    }

    /// Deposit stETH and receive yETH
    pub async fn deposit(&self, amount: &str) -> Result<VaultReceipt, VaultError> {
        let amount = parse_amount(amount, VaultOperation::Deposit)?;
        let call = IRestakeManager::depositCall { amount }.abi_encode();
        self.execute(self.steth, amount, call).await
    }

    /// Burn yETH and receive stETH
    pub async fn withdraw(&self, amount: &str) -> Result<VaultReceipt, VaultError> {
        let amount = parse_amount(amount, VaultOperation::Withdraw)?;
        let call = IRestakeManager::withdrawCall { amount }.abi_encode();
        self.execute(self.yeth, amount, call).await
    }

    /// Token amount the other side of the operation would yield
    pub async fn preview(&self, operation: VaultOperation, amount: &str) -> Result<U256, VaultError> {
        let amount = parse_amount(amount, operation)?;
        let out = match operation {
            VaultOperation::Deposit => self.manager.mint_amount(amount).await?,
            VaultOperation::Withdraw => self.manager.withdraw_amount(amount).await?,
        };
        Ok(out)
    }

    async fn execute(
        &self,
        token: Address,
        amount: U256,
        call: Vec<u8>,
    ) -> Result<VaultReceipt, VaultError> {
        let spender = self.manager.address();
        let allowance = self
            .tokens
            .allowance(token, self.account, spender)
            .await
            .map_err(VaultError::Loading)?;

        let approval = if allowance < amount {
            log::info!(
                "Approving {} of {} for {}",
                format_ether(amount),
                token,
                spender
            );
            let approve = IERC20::approveCall { spender, amount }.abi_encode();
            Some(self.send(token, approve).await?)
        } else {
            None
        };

        let receipt = self.send(spender, call).await?;
        log::info!("Vault transaction {} mined", receipt.transaction_hash);

        Ok(VaultReceipt {
            amount,
            approval,
            receipt,
        })
    }

    async fn send(&self, to: Address, data: Vec<u8>) -> Result<TxReceipt, VaultError> {
        let hash = self
            .sender
            .send_transaction(self.account, to, Bytes::from(data))
            .await?;
        let receipt = self.sender.wait_for_receipt(hash).await?;
        if !receipt.succeeded() {
            return Err(VaultError::Reverted(hash));
        }
        Ok(receipt)
    }
}
