//! Periodic drivers for the discovery and price sampling jobs

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::domain::discovery::AssetDiscoveryJob;
use crate::domain::price::{PriceSamplingJob, SamplingReport};
use crate::shared::config::ScheduleCfg;

/// One unit of periodic work. Failures are handled inside `run_once`.
#[async_trait]
pub trait PeriodicJob: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run_once(&self);
}

#[async_trait]
impl PeriodicJob for AssetDiscoveryJob {
    fn name(&self) -> &'static str {
        "asset-discovery"
    }

    async fn run_once(&self) {
        match self.run_cycle().await {
            Ok(report) => debug!(
                universe = report.universe_size,
                new = report.new_assets.len(),
                "discovery cycle complete"
            ),
            Err(e) => error!("❌ Discovery cycle aborted: {}", e),
        }
    }
}

#[async_trait]
impl PeriodicJob for PriceSamplingJob {
    fn name(&self) -> &'static str {
        "price-sampling"
    }

    async fn run_once(&self) {
        if let SamplingReport::Skipped(reason) = self.run_cycle().await {
            debug!(?reason, "price sampling skipped");
        }
    }
}

/// Running timers; dropping it leaves them running
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Stop every timer after its in-flight run, if any, completes
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Registers jobs with their own initial delay and period, then starts them
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<(Arc<dyn PeriodicJob>, Duration, Duration)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn every(mut self, job: Arc<dyn PeriodicJob>, initial_delay: Duration, period: Duration) -> Self {
        self.jobs.push((job, initial_delay, period));
        self
    }

    /// Discovery and sampling with the configured cadence
    pub fn for_jobs(
        discovery: Arc<AssetDiscoveryJob>,
        sampling: Arc<PriceSamplingJob>,
        schedule: &ScheduleCfg,
    ) -> Self {
        Self::new()
            .every(
                discovery,
                Duration::from_secs(schedule.discovery_initial_delay_secs),
                Duration::from_secs(schedule.discovery_interval_secs),
            )
            .every(
                sampling,
                Duration::from_secs(schedule.sampling_initial_delay_secs),
                Duration::from_secs(schedule.sampling_interval_secs),
            )
    }

    pub fn start(self) -> SchedulerHandle {
        let (shutdown, rx) = watch::channel(false);
        let tasks = self
            .jobs
            .into_iter()
            .map(|(job, delay, period)| tokio::spawn(drive(job, delay, period, rx.clone())))
            .collect();
        SchedulerHandle { shutdown, tasks }
    }
}

/// A job's next run waits for the previous one, so a job never overlaps itself
async fn drive(
    job: Arc<dyn PeriodicJob>,
    initial_delay: Duration,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        "⏰ Scheduling {} every {:?} after {:?}",
        job.name(),
        period,
        initial_delay
    );
    let mut timer = interval_at(Instant::now() + initial_delay, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Shutdown wins over a tick that came due during a long run
        tokio::select! {
            biased;
            Ok(()) = shutdown.changed() => break,
            _ = timer.tick() => job.run_once().await,
        }
    }
    debug!(job = job.name(), "timer stopped");
}
