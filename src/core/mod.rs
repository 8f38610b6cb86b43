//! Core data model
//!
//! This module contains the records the rest of the crate passes around:
//! - Proposals and the raw calls they authorize
//! - Administrative actions and their call encoding
//! - The saved action form
//! - Withdrawal records observed from events
//! - Receipts of mined write transactions
//! - User-visible notices

pub mod action;
pub mod draft;
pub mod notice;
pub mod proposal;
pub mod receipt;
pub mod withdrawal;

pub use action::{ActionTargets, AdminAction};
pub use draft::{Draft, DraftError, DraftMethod};
pub use notice::{ErrorKind, Notice};
pub use proposal::{Proposal, ProposalCall, UnsignedProposal};
pub use receipt::TxReceipt;
pub use withdrawal::{CompletedWithdrawal, QueuedWithdrawal, WithdrawalError};
