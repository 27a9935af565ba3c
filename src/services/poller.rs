//! Fixed-interval realtime polling

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use crate::services::dashboard::DashboardService;
use crate::types::{RealtimeData, Result};

/// Polls the realtime view on a fixed interval.
///
/// Each poll is awaited before the next tick is taken, so polls never
/// overlap; a slow poll delays the schedule instead of stacking requests.
pub struct RealtimePoller {
    dashboard: Arc<DashboardService>,
    interval: Duration,
}

impl RealtimePoller {
    pub fn new(dashboard: Arc<DashboardService>, interval: Duration) -> Self {
        Self {
            dashboard,
            interval,
        }
    }

    /// Poll immediately, then every `interval`, handing each outcome to
    /// `on_update` until `stop` resolves. Returns the number of polls made.
    pub async fn run<F, S>(&self, mut on_update: F, stop: S) -> usize
    where
        F: FnMut(Result<RealtimeData>),
        S: Future<Output = ()>,
    {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(stop);

        let mut polls = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    let outcome = self.dashboard.realtime_view().await;
                    if let Err(e) = &outcome {
                        log::warn!("realtime poll failed: {}", e);
                    }
                    polls += 1;
                    on_update(outcome);
                }
            }
        }
        log::debug!("realtime poller stopped after {} polls", polls);
        polls
    }
}
