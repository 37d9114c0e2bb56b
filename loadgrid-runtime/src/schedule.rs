//! Ramping arrival-rate curve
use loadgrid_core::Stage;
use std::time::Duration;

/// Piecewise-linear arrival rate: starting at `start_rate`, each stage moves
/// linearly from the previous target to its own over its duration.
#[derive(Clone, Debug)]
pub struct RampSchedule {
    start_rate: u32,
    stages: Vec<Stage>,
}

impl RampSchedule {
    pub fn new(start_rate: u32, stages: &[Stage]) -> Self {
        Self {
            start_rate,
            stages: stages.to_vec(),
        }
    }

    pub fn total(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// Iterations per time unit, `elapsed` after the start of the run.
    pub fn rate_at(&self, elapsed: Duration) -> f64 {
        let mut from = self.start_rate as f64;
        let mut remaining = elapsed;

        for stage in &self.stages {
            let target = stage.target as f64;
            if remaining < stage.duration {
                let progress = remaining.as_secs_f64() / stage.duration.as_secs_f64();
                return from + (target - from) * progress;
            }
            remaining -= stage.duration;
            from = target;
        }

        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn flat_stage() {
        let schedule = RampSchedule::new(1500, &[Stage::new(secs(30), 1500)]);
        assert_eq!(schedule.total(), secs(30));
        assert_eq!(schedule.rate_at(Duration::ZERO), 1500.);
        assert_eq!(schedule.rate_at(secs(15)), 1500.);
        assert_eq!(schedule.rate_at(secs(45)), 1500.);
    }

    #[test]
    fn ramps_between_targets() {
        let stages = [Stage::new(secs(30), 400), Stage::new(secs(30), 800)];
        let schedule = RampSchedule::new(400, &stages);
        assert_eq!(schedule.rate_at(secs(10)), 400.);
        assert_eq!(schedule.rate_at(secs(30)), 400.);
        assert_eq!(schedule.rate_at(secs(45)), 600.);
        assert_eq!(schedule.rate_at(secs(60)), 800.);
    }

    #[test]
    fn ramps_down_to_zero() {
        let schedule = RampSchedule::new(100, &[Stage::new(secs(10), 0)]);
        assert_eq!(schedule.rate_at(secs(5)), 50.);
        assert_eq!(schedule.rate_at(secs(10)), 0.);
    }

    #[test]
    fn zero_length_stage_jumps() {
        let stages = [Stage::new(Duration::ZERO, 50), Stage::new(secs(10), 50)];
        let schedule = RampSchedule::new(10, &stages);
        assert_eq!(schedule.rate_at(Duration::ZERO), 50.);
        assert_eq!(schedule.rate_at(secs(3)), 50.);
    }
}
