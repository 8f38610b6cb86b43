//! Drives the gate from live chain data
//!
//! Each evaluation reads the delay, the height and both event histories
//! concurrently and builds a fresh report. The watch loop re-evaluates
//! whenever the chain height moves and publishes through a `watch` channel.

use crate::contract::{ChainReader, DelegationManager, WithdrawalEventSource};
use crate::withdrawal::gate::GateReport;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Reads everything the gate needs
pub struct WithdrawalGate {
    events: Arc<dyn WithdrawalEventSource>,
    delegation: Arc<dyn DelegationManager>,
    chain: Arc<dyn ChainReader>,
    from_block: u64,
}

impl WithdrawalGate {
    pub fn new(
        events: Arc<dyn WithdrawalEventSource>,
        delegation: Arc<dyn DelegationManager>,
        chain: Arc<dyn ChainReader>,
        from_block: u64,
    ) -> Self {
        Self {
            events,
            delegation,
            chain,
            from_block,
        }
    }

    /// Evaluate the gate once
    ///
    /// Never fails: a missing delay or height leaves every entry Queued, and
    /// an unreadable event history yields an unloaded, empty report.
    pub async fn evaluate(&self) -> GateReport {
        let (delay, height, queued, completed) = futures::join!(
            self.delegation.min_withdrawal_delay_blocks(),
            self.chain.block_number(),
            self.events.withdrawals_queued(self.from_block),
            self.events.withdrawals_completed(self.from_block),
        );

        let delay = delay
            .map_err(|e| log::warn!("Withdrawal delay unavailable: {}", e))
            .ok();
        let height = height
            .map_err(|e| log::warn!("Block height unavailable: {}", e))
            .ok();

        match (queued, completed) {
            (Ok(queued), Ok(completed)) => {
                let report = GateReport::new(&queued, &completed, height, delay);
                log::debug!(
                    "Gate at height {:?}: {} outstanding, {} ready",
                    height,
                    report.entries.len(),
                    report.ready().count()
                );
                report
            }
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Withdrawal events unavailable: {}", e);
                GateReport::unloaded(height, delay)
            }
        }
    }

    /// Start re-evaluating on every new block
    ///
    /// The first report is computed before this returns. The task stops once
    /// every receiver has been dropped.
    pub async fn watch(
        self: Arc<Self>,
        poll_interval: Duration,
    ) -> (watch::Receiver<GateReport>, JoinHandle<()>) {
        let initial = self.evaluate().await;
        let mut last_height = initial.height;
        let mut last_complete = is_complete(&initial);
        let (sender, receiver) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if sender.is_closed() {
                    break;
                }

                let height = match self.chain.block_number().await {
                    Ok(height) => height,
                    Err(e) => {
                        log::warn!("Polling block height failed: {}", e);
                        continue;
                    }
                };
                // A partial report is retried even without a new block
                if last_complete && last_height == Some(height) {
                    continue;
                }

                let report = self.evaluate().await;
                last_height = report.height.or(Some(height));
                last_complete = is_complete(&report);
                sender.send_if_modified(|current| {
                    if *current == report {
                        return false;
                    }
                    *current = report;
                    true
                });
            }
            log::debug!("Withdrawal watcher stopped");
        });

        (receiver, handle)
    }
}

fn is_complete(report: &GateReport) -> bool {
    report.loaded && report.height.is_some() && report.delay.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CompletedWithdrawal, QueuedWithdrawal};
    use crate::mock::SimulatedChain;
    use crate::withdrawal::Readiness;
    use alloy_primitives::{B256, U256};

    fn queued(nonce: u64, start_block: u64) -> QueuedWithdrawal {
        QueuedWithdrawal {
            withdraw_root: B256::repeat_byte(0x0a),
            staker: Default::default(),
            delegated_to: Default::default(),
            withdrawer: Default::default(),
            nonce: U256::from(nonce),
            start_block: U256::from(start_block),
            strategies: vec![],
            shares: vec![],
        }
    }

    fn gate(chain: &Arc<SimulatedChain>) -> Arc<WithdrawalGate> {
        Arc::new(WithdrawalGate::new(
            chain.clone(),
            chain.clone(),
            chain.clone(),
            0,
        ))
    }

    #[tokio::test]
    async fn test_evaluate_scenario() {
        let chain = Arc::new(SimulatedChain::new(1099, 100));
        chain.queue(queued(5, 1000));
        let gate = gate(&chain);

        let report = gate.evaluate().await;
        assert!(report.loaded);
        assert_eq!(report.get(U256::from(5)).unwrap().readiness, Readiness::Queued);

        chain.set_height(1100);
        let report = gate.evaluate().await;
        assert_eq!(report.get(U256::from(5)).unwrap().readiness, Readiness::Ready);

        chain.complete(CompletedWithdrawal {
            withdrawal_root: B256::repeat_byte(0x0a),
            nonce: U256::from(5),
        });
        chain.set_height(5000);
        assert!(gate.evaluate().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_missing_delay_keeps_everything_queued() {
        let chain = Arc::new(SimulatedChain::new(10_000, 100));
        chain.queue(queued(1, 10));
        chain.fail_delay(true);

        let report = gate(&chain).evaluate().await;
        assert!(report.loaded);
        assert_eq!(report.delay, None);
        assert_eq!(report.get(U256::from(1)).unwrap().readiness, Readiness::Queued);
    }

    #[tokio::test]
    async fn test_failed_events_yield_unloaded_report() {
        let chain = Arc::new(SimulatedChain::new(10_000, 100));
        chain.queue(queued(1, 10));
        chain.fail_events(true);

        let report = gate(&chain).evaluate().await;
        assert!(!report.loaded);
        assert!(report.entries.is_empty());
    }

    #[tokio::test]
    async fn test_watch_publishes_on_new_block() {
        let chain = Arc::new(SimulatedChain::new(1099, 100));
        chain.queue(queued(5, 1000));

        let (mut reports, handle) = gate(&chain).watch(Duration::from_millis(5)).await;
        assert_eq!(
            reports.borrow().get(U256::from(5)).unwrap().readiness,
            Readiness::Queued
        );

        chain.set_height(1100);
        tokio::time::timeout(Duration::from_secs(2), reports.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            reports.borrow().get(U256::from(5)).unwrap().readiness,
            Readiness::Ready
        );

        drop(reports);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_watch_recovers_without_new_block() {
        let chain = Arc::new(SimulatedChain::new(2000, 100));
        chain.queue(queued(5, 1000));
        chain.fail_events(true);

        let (mut reports, handle) = gate(&chain).watch(Duration::from_millis(5)).await;
        assert!(!reports.borrow().loaded);

        chain.fail_events(false);
        tokio::time::timeout(Duration::from_secs(2), reports.changed())
            .await
            .unwrap()
            .unwrap();
        let report = reports.borrow().clone();
        assert!(report.loaded);
        assert_eq!(report.height, Some(2000));
        assert_eq!(report.get(U256::from(5)).unwrap().readiness, Readiness::Ready);

        handle.abort();
    }
}
