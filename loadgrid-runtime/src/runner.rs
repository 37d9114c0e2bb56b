//! Drives a [`RunConfig`] against its targets.
use crate::report::{RunReport, ScenarioReport};
use crate::schedule::RampSchedule;
use crate::RuntimeError;
use loadgrid::{ExecutorDescriptor, RunConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// How long a scenario idles before re-reading a zero arrival rate.
pub const RAMP_TICK: Duration = Duration::from_secs(1);

/// Runs every scenario of a configuration concurrently until its stages are done.
///
/// Iterations are started at the scenario's current arrival rate. Each one holds
/// a virtual user from its host's pool for as long as the driver runs; when the
/// pool is empty the iteration is dropped rather than queued.
#[derive(Clone, Debug)]
pub struct Runner {
    tick: Duration,
    max_duration: Option<Duration>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self {
            tick: RAMP_TICK,
            max_duration: None,
        }
    }

    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Stop every scenario after `duration`, even if stages remain.
    pub fn max_duration(mut self, duration: Option<Duration>) -> Self {
        self.max_duration = duration;
        self
    }

    #[instrument(name = "run", skip_all, fields(run_id = %config.run_id()))]
    pub async fn run(&self, config: &RunConfig) -> Result<RunReport, RuntimeError> {
        let start = Instant::now();

        // One virtual-user pool per host, shared by all of that host's scenarios.
        let mut pools: HashMap<&str, Arc<Semaphore>> = HashMap::new();
        let mut tasks = JoinSet::new();

        for (key, descriptor) in config.scenarios() {
            let vus = pools
                .entry(key.host())
                .or_insert_with(|| Arc::new(Semaphore::new(descriptor.max_vus as usize)))
                .clone();

            let scenario = ScenarioRun {
                descriptor: descriptor.clone(),
                vus,
                tick: self.tick,
                max_duration: self.max_duration,
            };
            tasks.spawn(scenario.run().in_current_span());
        }

        let mut scenarios = Vec::with_capacity(config.scenarios().len());
        while let Some(res) = tasks.join_next().await {
            scenarios.push(res?);
        }
        scenarios.sort_by(|a, b| a.key.cmp(&b.key));

        let report = RunReport {
            run_id: config.run_id(),
            elapsed: start.elapsed(),
            scenarios,
        };
        info!(
            "Run complete: {} checks passed, {} failed",
            report.checks_passed(),
            report.checks_failed()
        );
        Ok(report)
    }
}

struct ScenarioRun {
    descriptor: ExecutorDescriptor,
    vus: Arc<Semaphore>,
    tick: Duration,
    max_duration: Option<Duration>,
}

#[derive(Default)]
struct IterationCounts {
    started: u64,
    dropped: u64,
}

impl ScenarioRun {
    #[instrument(name = "scenario", skip_all, fields(key = %self.descriptor.exec.key()))]
    async fn run(self) -> ScenarioReport {
        let descriptor = &self.descriptor;
        let schedule = RampSchedule::new(descriptor.start_rate, &descriptor.stages);
        let length = match self.max_duration {
            Some(max) => schedule.total().min(max),
            None => schedule.total(),
        };
        info!(
            "Starting at {}/{:?} for {:?}",
            descriptor.start_rate, descriptor.time_unit, length
        );

        let start = Instant::now();
        let deadline = start + length;

        // Each start is spaced by the period of the rate in effect when it fires.
        let mut next = start;
        let mut counts = IterationCounts::default();
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                biased;

                _ = sleep_until(deadline) => break,

                Some(res) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(err) = res {
                        error!("Iteration failed: {err}");
                    }
                }

                _ = sleep_until(next) => {
                    let now = Instant::now();
                    let rate = schedule.rate_at(now - start);
                    match period(rate, descriptor.time_unit) {
                        Some(period) => {
                            self.issue(&mut in_flight, &mut counts);
                            next += period;
                        }
                        None => {
                            trace!("Rate is zero, idling");
                            next = now + self.tick;
                        }
                    }
                }
            }
        }

        debug!("Waiting on {} in-flight iterations", in_flight.len());
        while let Some(res) = in_flight.join_next().await {
            if let Err(err) = res {
                error!("Iteration failed: {err}");
            }
        }

        let IterationCounts { started, dropped } = counts;
        if dropped > 0 {
            warn!("{dropped} iterations dropped, no virtual user available");
        }
        info!("Scenario complete after {started} iterations");

        ScenarioReport::new(&descriptor.exec, started, dropped)
    }

    fn issue(&self, in_flight: &mut JoinSet<()>, counts: &mut IterationCounts) {
        match self.vus.clone().try_acquire_owned() {
            Ok(permit) => {
                counts.started += 1;
                let driver = self.descriptor.exec.clone();
                in_flight.spawn(
                    async move {
                        driver.run().await;
                        drop(permit);
                    }
                    .in_current_span(),
                );
            }
            Err(_) => {
                counts.dropped += 1;
                trace!("No virtual user available");
            }
        }
    }
}

/// Gap between two starts at `rate` iterations per `time_unit`, or `None`
/// when the rate is effectively zero.
pub(crate) fn period(rate: f64, time_unit: Duration) -> Option<Duration> {
    if !rate.is_finite() || rate < 1e-6 {
        return None;
    }
    Some(Duration::from_secs_f64(time_unit.as_secs_f64() / rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgrid_core::{GlobalVus, Host, Profile, Stage};

    fn config(address: &str, target: u32, max_vus: u32, pacing: Duration) -> RunConfig {
        let profile = Profile::new(
            "highmem",
            vec![Stage::new(Duration::from_secs(1), target)],
            15,
        )
        .unwrap();

        RunConfig::builder()
            .hosts(vec![Host::new("target", address)])
            .profiles(vec![profile])
            .vus(GlobalVus {
                pre_allocated_vus: max_vus,
                max_vus,
                time_unit: Duration::from_secs(1),
            })
            .pacing(pacing)
            .build()
            .unwrap()
    }

    #[test]
    fn period_per_time_unit() {
        let minute = Duration::from_secs(60);
        assert_eq!(period(0., minute), None);
        assert_eq!(period(f64::NAN, minute), None);
        assert_eq!(period(30., minute), Some(Duration::from_secs(2)));
        assert_eq!(period(1500., minute), Some(Duration::from_millis(40)));
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(20_000)]
    async fn failed_iterations_are_counted_and_recorded() {
        // Nothing listens on port 1, every check fails.
        let config = config("127.0.0.1:1", 20, 50, Duration::ZERO);
        let report = Runner::new()
            .tick(Duration::from_millis(100))
            .run(&config)
            .await
            .unwrap();

        let scenario = report.scenario("target_highmem").unwrap();
        assert!(scenario.iterations > 0);
        assert_eq!(scenario.dropped_iterations, 0);
        assert_eq!(scenario.checks_passed, 0);
        assert_eq!(scenario.checks_failed, scenario.iterations);
        assert_eq!(scenario.waiting.count as u64, scenario.iterations);
        assert_eq!(scenario.duration.count as u64, scenario.iterations);
        assert_eq!(report.checks_failed(), scenario.iterations);
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(20_000)]
    async fn exhausted_pool_drops_iterations() {
        let config = config("127.0.0.1:1", 50, 1, Duration::from_millis(300));
        let report = Runner::new()
            .tick(Duration::from_millis(100))
            .run(&config)
            .await
            .unwrap();

        let scenario = report.scenario("target_highmem").unwrap();
        assert!(scenario.iterations >= 1);
        assert!(scenario.iterations <= 5);
        assert!(scenario.dropped_iterations > 0);
        assert!(logs_contain("iterations dropped"));
    }

    #[tokio::test]
    #[ntest::timeout(20_000)]
    async fn low_rate_follows_the_time_unit() {
        // 30/min over 2s allows a single start at t=0 (the next is due at 2s).
        // 6/min over 5s allows one as well.
        for (stage, target) in [(2, 30), (5, 6)] {
            let profile = Profile::new(
                "highmem",
                vec![Stage::new(Duration::from_secs(stage), target)],
                15,
            )
            .unwrap();
            let config = RunConfig::builder()
                .hosts(vec![Host::new("target", "127.0.0.1:1")])
                .profiles(vec![profile])
                .pacing(Duration::ZERO)
                .build()
                .unwrap();

            let report = Runner::new()
                .tick(Duration::from_millis(100))
                .run(&config)
                .await
                .unwrap();

            let scenario = report.scenario("target_highmem").unwrap();
            assert!(
                (1..=2).contains(&scenario.iterations),
                "{target}/min over {stage}s started {}",
                scenario.iterations
            );
            assert_eq!(scenario.dropped_iterations, 0);
        }
    }

    #[tokio::test]
    #[ntest::timeout(20_000)]
    async fn max_duration_caps_the_run() {
        let config = config("127.0.0.1:1", 10, 10, Duration::ZERO);
        let report = Runner::new()
            .tick(Duration::from_millis(50))
            .max_duration(Some(Duration::from_millis(200)))
            .run(&config)
            .await
            .unwrap();

        assert!(report.elapsed < Duration::from_millis(900));
    }
}
