//! Tokio-backed frame clock

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};
use verity_domain::traits::FrameScheduler;

/// Frame boundaries at a fixed period
///
/// Missed ticks are delayed rather than bursted, so a slow pass never
/// triggers a run of back-to-back frames.
#[derive(Debug)]
pub struct IntervalFrames {
    ticker: Interval,
}

impl IntervalFrames {
    /// Create a frame clock with the given period (must be non-zero)
    pub fn new(period: Duration) -> Self {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { ticker }
    }
}

impl FrameScheduler for IntervalFrames {
    fn next_frame(&mut self) -> impl Future<Output = ()> {
        async move {
            self.ticker.tick().await;
        }
    }
}
