use loadgrid::{Driver, TrendRecorder};
use loadgrid_core::ScenarioKey;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Summary of one trend series, in milliseconds.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub p50: f64,
    pub p90: f64,
    pub max: f64,
}

impl Summary {
    pub fn from_samples(mut samples: Vec<f64>) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        samples.sort_by(f64::total_cmp);

        Self {
            count: samples.len(),
            p50: quantile(&samples, 0.5),
            p90: quantile(&samples, 0.9),
            max: samples[samples.len() - 1],
        }
    }

    pub fn from_recorder(recorder: &TrendRecorder) -> Self {
        Self::from_samples(recorder.samples())
    }
}

/// Quantile of sorted samples, taken at the rounded linear index `q * (n - 1)`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let idx = (q * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={}, p50={:.2}ms, p90={:.2}ms, max={:.2}ms",
            self.count, self.p50, self.p90, self.max
        )
    }
}

#[derive(Clone, Debug)]
pub struct ScenarioReport {
    pub key: ScenarioKey,
    pub iterations: u64,
    pub dropped_iterations: u64,
    pub checks_passed: u64,
    pub checks_failed: u64,
    pub waiting: Summary,
    pub duration: Summary,
}

impl ScenarioReport {
    pub(crate) fn new(driver: &Driver, iterations: u64, dropped_iterations: u64) -> Self {
        Self {
            key: driver.key().clone(),
            iterations,
            dropped_iterations,
            checks_passed: driver.checks().passed(),
            checks_failed: driver.checks().failed(),
            waiting: Summary::from_recorder(&driver.recorders().waiting),
            duration: Summary::from_recorder(&driver.recorders().duration),
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: iterations={}, dropped={}, checks={}/{}",
            self.key,
            self.iterations,
            self.dropped_iterations,
            self.checks_passed,
            self.checks_passed + self.checks_failed,
        )?;
        writeln!(f, "    waiting:  {}", self.waiting)?;
        write!(f, "    duration: {}", self.duration)
    }
}

/// What a finished run looked like, per scenario.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub elapsed: Duration,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn checks_failed(&self) -> u64 {
        self.scenarios.iter().map(|s| s.checks_failed).sum()
    }

    pub fn checks_passed(&self) -> u64 {
        self.scenarios.iter().map(|s| s.checks_passed).sum()
    }

    pub fn scenario(&self, key: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.key.to_string() == key)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {} finished in {:?}", self.run_id, self.elapsed)?;
        for scenario in &self.scenarios {
            writeln!(f, "  {scenario}")?;
        }
        write!(
            f,
            "  checks: {} passed, {} failed",
            self.checks_passed(),
            self.checks_failed()
        )
    }
}
