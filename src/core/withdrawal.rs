//! Withdrawal records observed from OperatorDelegator events

use crate::contract::abi::IOperatorDelegator;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors turning an observed withdrawal into call parameters
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WithdrawalError {
    #[error("Start block {0} does not fit in 32 bits")]
    StartBlockOutOfRange(U256),
}

/// A withdrawal observed through a `WithdrawQueued` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedWithdrawal {
    pub withdraw_root: B256,
    pub staker: Address,
    pub delegated_to: Address,
    pub withdrawer: Address,
    #[serde(with = "crate::core::proposal::decimal")]
    pub nonce: U256,
    #[serde(with = "crate::core::proposal::decimal")]
    pub start_block: U256,
    pub strategies: Vec<Address>,
    pub shares: Vec<U256>,
}

impl QueuedWithdrawal {
    /// Parameters for `completeWithdrawal`
    pub fn to_withdrawal(&self) -> Result<IOperatorDelegator::Withdrawal, WithdrawalError> {
        if self.start_block > U256::from(u32::MAX) {
            return Err(WithdrawalError::StartBlockOutOfRange(self.start_block));
        }

        Ok(IOperatorDelegator::Withdrawal {
            staker: self.staker,
            delegatedTo: self.delegated_to,
            withdrawer: self.withdrawer,
            nonce: self.nonce,
            startBlock: self.start_block.to::<u32>(),
            strategies: self.strategies.clone(),
            shares: self.shares.clone(),
        })
    }

    /// Short form of the withdrawal root for display
    pub fn short_root(&self) -> String {
        let hex = self.withdraw_root.to_string();
        hex.chars().take(7).collect()
    }
}

impl From<IOperatorDelegator::WithdrawQueued> for QueuedWithdrawal {
    fn from(event: IOperatorDelegator::WithdrawQueued) -> Self {
        Self {
            withdraw_root: event.withdrawRoot,
            staker: event.staker,
            delegated_to: event.delegatedTo,
            withdrawer: event.withdrawer,
            nonce: event.nonce,
            start_block: event.startBlock,
            strategies: event.strategies,
            shares: event.shares,
        }
    }
}

/// A withdrawal observed through a `WithdrawalComplete` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWithdrawal {
    pub withdrawal_root: B256,
    #[serde(with = "crate::core::proposal::decimal")]
    pub nonce: U256,
}

impl From<IOperatorDelegator::WithdrawalComplete> for CompletedWithdrawal {
    fn from(event: IOperatorDelegator::WithdrawalComplete) -> Self {
        Self {
            withdrawal_root: event.withdrawalRoot,
            nonce: event.withdraw.nonce,
        }
    }
}
