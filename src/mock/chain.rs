//! In-memory chain with withdrawal history

use crate::contract::{ChainReader, DelegationManager, WithdrawalEventSource};
use crate::core::{CompletedWithdrawal, QueuedWithdrawal};
use crate::mock::lock;
use crate::rpc::RpcError;
use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// Chain height, withdrawal delay and the OperatorDelegator's events
#[derive(Debug, Default)]
pub struct SimulatedChain {
    height: AtomicU64,
    delay: Mutex<U256>,
    queued: Mutex<Vec<QueuedWithdrawal>>,
    completed: Mutex<Vec<CompletedWithdrawal>>,
    fail_delay: AtomicBool,
    fail_height: AtomicBool,
    fail_events: AtomicBool,
}

impl SimulatedChain {
    pub fn new(height: u64, delay: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
            delay: Mutex::new(U256::from(delay)),
            ..Default::default()
        }
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: U256) {
        *lock(&self.delay) = delay;
    }

    /// Emit a `WithdrawQueued` event
    pub fn queue(&self, withdrawal: QueuedWithdrawal) {
        lock(&self.queued).push(withdrawal);
    }

    /// Emit a `WithdrawalComplete` event
    pub fn complete(&self, withdrawal: CompletedWithdrawal) {
        lock(&self.completed).push(withdrawal);
    }

    pub fn fail_delay(&self, fail: bool) {
        self.fail_delay.store(fail, Ordering::SeqCst);
    }

    pub fn fail_height(&self, fail: bool) {
        self.fail_height.store(fail, Ordering::SeqCst);
    }

    pub fn fail_events(&self, fail: bool) {
        self.fail_events.store(fail, Ordering::SeqCst);
    }

    fn unavailable(flag: &AtomicBool, what: &str) -> Result<(), RpcError> {
        if flag.load(Ordering::SeqCst) {
            return Err(RpcError::Unavailable(what.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainReader for SimulatedChain {
    async fn block_number(&self) -> Result<u64, RpcError> {
        Self::unavailable(&self.fail_height, "eth_blockNumber")?;
        Ok(self.height.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl DelegationManager for SimulatedChain {
    async fn min_withdrawal_delay_blocks(&self) -> Result<U256, RpcError> {
        Self::unavailable(&self.fail_delay, "minWithdrawalDelayBlocks")?;
        Ok(*lock(&self.delay))
    }
}

#[async_trait]
impl WithdrawalEventSource for SimulatedChain {
    async fn withdrawals_queued(&self, from_block: u64) -> Result<Vec<QueuedWithdrawal>, RpcError> {
        Self::unavailable(&self.fail_events, "eth_getLogs")?;
        Ok(lock(&self.queued)
            .iter()
            .filter(|q| q.start_block >= U256::from(from_block))
            .cloned()
            .collect())
    }

    async fn withdrawals_completed(
        &self,
        _from_block: u64,
    ) -> Result<Vec<CompletedWithdrawal>, RpcError> {
        Self::unavailable(&self.fail_events, "eth_getLogs")?;
        Ok(lock(&self.completed).clone())
    }
}
