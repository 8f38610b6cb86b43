//! Classification of outstanding withdrawals
//!
//! A queued withdrawal becomes completable once the chain has advanced
//! `minWithdrawalDelayBlocks` past its start block. The classification is a
//! pure function of the two event streams, the chain height and the delay;
//! nothing is cached between evaluations.

use crate::core::{AdminAction, CompletedWithdrawal, QueuedWithdrawal};
use crate::multisig::ProposalError;
use alloy_primitives::U256;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Readiness {
    /// Waiting for the withdrawal delay to pass
    Queued,
    /// May be completed now
    Ready,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Queued => write!(f, "Queued"),
            Readiness::Ready => write!(f, "Ready"),
        }
    }
}

/// An outstanding withdrawal and its readiness
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedWithdrawal {
    pub withdrawal: QueuedWithdrawal,
    pub readiness: Readiness,
    /// First height at which the withdrawal is completable, if known
    pub ready_at: Option<U256>,
}

/// Classify every queued withdrawal without a matching completion
///
/// Entries are keyed by withdrawal nonce. If the height or the delay is
/// unknown every entry stays `Queued`. Completions without a queued
/// counterpart are ignored, and when a nonce is queued twice the first event
/// wins.
pub fn classify(
    queued: &[QueuedWithdrawal],
    completed: &[CompletedWithdrawal],
    height: Option<u64>,
    delay: Option<U256>,
) -> BTreeMap<U256, ClassifiedWithdrawal> {
    let done: HashSet<U256> = completed.iter().map(|c| c.nonce).collect();
    let mut pending = BTreeMap::new();

    for withdrawal in queued.iter().filter(|q| !done.contains(&q.nonce)) {
        let ready_at = delay.and_then(|d| withdrawal.start_block.checked_add(d));
        let readiness = match (height, ready_at) {
            (Some(height), Some(ready_at)) if U256::from(height) >= ready_at => Readiness::Ready,
            _ => Readiness::Queued,
        };

        pending
            .entry(withdrawal.nonce)
            .or_insert_with(|| ClassifiedWithdrawal {
                withdrawal: withdrawal.clone(),
                readiness,
                ready_at,
            });
    }

    pending
}

/// One evaluation of the gate
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateReport {
    pub entries: BTreeMap<U256, ClassifiedWithdrawal>,
    pub height: Option<u64>,
    pub delay: Option<U256>,
    /// False when the event history could not be read
    pub loaded: bool,
}

impl GateReport {
    pub fn new(
        queued: &[QueuedWithdrawal],
        completed: &[CompletedWithdrawal],
        height: Option<u64>,
        delay: Option<U256>,
    ) -> Self {
        Self {
            entries: classify(queued, completed, height, delay),
            height,
            delay,
            loaded: true,
        }
    }

    /// Report for an evaluation whose event history failed to load
    pub fn unloaded(height: Option<u64>, delay: Option<U256>) -> Self {
        Self {
            entries: BTreeMap::new(),
            height,
            delay,
            loaded: false,
        }
    }

    pub fn get(&self, nonce: U256) -> Option<&ClassifiedWithdrawal> {
        self.entries.get(&nonce)
    }

    pub fn ready(&self) -> impl Iterator<Item = &ClassifiedWithdrawal> {
        self.entries
            .values()
            .filter(|e| e.readiness == Readiness::Ready)
    }

    /// The `completeWithdrawal` action for `nonce`, if it is Ready
    pub fn completion(&self, nonce: U256) -> Result<AdminAction, ProposalError> {
        if !self.loaded {
            return Err(ProposalError::Loading);
        }
        match self.get(nonce) {
            Some(entry) if entry.readiness == Readiness::Ready => Ok(
                AdminAction::CompleteWithdrawal(entry.withdrawal.to_withdrawal()?),
            ),
            _ => Err(ProposalError::NotReady(nonce)),
        }
    }
}
