//! Withdrawal readiness
//!
//! Reconciles `WithdrawQueued` and `WithdrawalComplete` events against the
//! delegation manager's minimum delay and the chain height:
//! - `gate`: pure classification into Queued and Ready
//! - `watcher`: live evaluation and a block-driven watch loop

pub mod gate;
pub mod watcher;

pub use gate::{classify, ClassifiedWithdrawal, GateReport, Readiness};
pub use watcher::WithdrawalGate;
