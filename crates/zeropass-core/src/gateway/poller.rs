//! Periodic rule-set refresh

use super::ApiGateway;
use crate::types::RuleSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Background task that re-reads the rule-set list on an interval and
/// publishes every result on a watch channel.
///
/// Refreshes go through the normal cache-aside read, so a tick inside the
/// cache TTL republishes the cached list. Concurrent user writes race with
/// the poller; the last write to the cache wins.
#[derive(Debug)]
pub struct RuleSetPoller {
    receiver: watch::Receiver<Vec<RuleSet>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RuleSetPoller {
    /// Start polling immediately; the first tick fires without delay
    pub fn spawn(gateway: Arc<ApiGateway>, interval: Duration, cancel: CancellationToken) -> Self {
        let (sender, receiver) = watch::channel(Vec::new());
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => {
                        debug!("Rule set poller cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let rule_sets = gateway.get_rule_sets().await;
                        debug!(count = rule_sets.len(), "Rule set poll");
                        if sender.send(rule_sets).is_err() {
                            // Every receiver is gone
                            break;
                        }
                    }
                }
            }
        });

        Self {
            receiver,
            cancel,
            handle,
        }
    }

    /// A new receiver observing every published list
    pub fn subscribe(&self) -> watch::Receiver<Vec<RuleSet>> {
        self.receiver.clone()
    }

    /// The most recently published list
    pub fn latest(&self) -> Vec<RuleSet> {
        self.receiver.borrow().clone()
    }

    /// Cancel the task and wait for it to stop
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
