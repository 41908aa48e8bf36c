//! Fixed-timestep stepping driver.

use crate::Error;
use core::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub ticks: u64,
    /// Ticks whose step took longer than the period
    pub overruns: u64,
}

/// Calls a step function once per fixed period until shut down.
///
/// Late ticks are run back to back so the number of steps always matches the
/// elapsed time.
pub struct Scheduler {
    period: Duration,
    timestep: f32,
    max_ticks: Option<u64>,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Create a new scheduler stepping every `timestep` seconds.
    pub fn new(timestep: f32) -> Result<Self, Error> {
        if !(timestep.is_finite() && timestep > 0.) {
            return Err(Error::InvalidConfig("timestep must be positive"));
        }

        Ok(Self {
            period: Duration::from_secs_f32(timestep),
            timestep,
            max_ticks: None,
            stats: SchedulerStats::default(),
        })
    }

    /// Builder method to stop after `max_ticks` steps.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Run `step` with the timestep (in seconds) until `shutdown` completes or
    /// the tick limit is reached.
    pub async fn run<F, Fut>(&mut self, mut step: F, shutdown: Fut) -> SchedulerStats
    where
        F: FnMut(f32),
        Fut: Future<Output = ()>,
    {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        tokio::pin!(shutdown);

        while self.max_ticks.map_or(true, |max| self.stats.ticks < max) {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    debug!(ticks = self.stats.ticks, "scheduler shut down");
                    break;
                }
                _ = interval.tick() => {
                    let start = Instant::now();
                    step(self.timestep);
                    self.stats.ticks += 1;

                    let elapsed = start.elapsed();
                    if elapsed > self.period {
                        self.stats.overruns += 1;
                        warn!(
                            tick = self.stats.ticks,
                            elapsed_us = elapsed.as_micros() as u64,
                            period_us = self.period.as_micros() as u64,
                            "tick overran its period"
                        );
                    }
                }
            }
        }

        self.stats
    }
}
