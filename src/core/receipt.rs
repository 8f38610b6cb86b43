//! Outcome of a mined write transaction

use alloy_primitives::B256;
use alloy_rpc_types_eth::TransactionReceipt;

/// The parts of a transaction receipt the client acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    /// False when the transaction reverted
    pub status: bool,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status
    }
}

impl From<&TransactionReceipt> for TxReceipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            status: receipt.status(),
        }
    }
}
