//! Load profiles and the built-in catalog
use crate::{ConfigError, DEFAULT_PROFILE};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

/// One leg of a ramp: move towards `target` iterations per time unit over `duration`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Stage {
    #[serde(serialize_with = "crate::human_duration::serialize")]
    pub duration: Duration,
    pub target: u32,
}

impl Stage {
    pub const fn new(duration: Duration, target: u32) -> Self {
        Self { duration, target }
    }
}

/// A named ramp plus the intensity sent to the target with every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    name: String,
    stages: Vec<Stage>,
    intensity: u64,
}

impl Profile {
    pub fn new(name: &str, stages: Vec<Stage>, intensity: u64) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::EmptyStages(name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            stages,
            intensity,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn intensity(&self) -> u64 {
        self.intensity
    }

    /// The ramp starts at the first stage's target.
    pub fn start_rate(&self) -> u32 {
        // NOTE: `Profile::new` refuses empty stage lists.
        self.stages[0].target
    }

    /// Total wall time covered by the stages.
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }
}

const fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

const fn mins(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

// `highmem*` intensities are megabytes allocated per request, `highcpu*` are loop
// iterations. The load profiles only exercise throughput and ask for the minimum.
const BUILTIN: &[(&str, &[Stage], u64)] = &[
    ("highmem", &[Stage::new(secs(30), 1500)], 15),
    (
        "highcpu",
        &[Stage::new(secs(30), 400), Stage::new(secs(30), 800)],
        333 * 1000,
    ),
    (
        "highmem1",
        &[
            Stage::new(mins(1), 1500),
            Stage::new(mins(3), 1500),
            Stage::new(secs(30), 1500),
        ],
        15,
    ),
    (
        "highcpu1",
        &[
            Stage::new(mins(1), 500),
            Stage::new(mins(2), 1000),
            Stage::new(mins(2), 1500),
            Stage::new(mins(4), 1500),
        ],
        333 * 1000,
    ),
    (
        "highload",
        &[
            Stage::new(mins(1), 10_000),
            Stage::new(mins(3), 10_000),
            Stage::new(secs(30), 10_000),
        ],
        1,
    ),
    (
        "lowload",
        &[
            Stage::new(mins(1), 1000),
            Stage::new(mins(3), 1000),
            Stage::new(secs(30), 1000),
        ],
        1,
    ),
];

/// Read-only lookup from profile name to its definition.
///
/// Iteration follows insertion order, which for [`Catalog::builtin`] is the
/// order of the table above.
#[derive(Clone, Debug)]
pub struct Catalog {
    profiles: Vec<Profile>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let profiles = BUILTIN
            .iter()
            .map(|(name, stages, intensity)| Profile {
                name: name.to_string(),
                stages: stages.to_vec(),
                intensity: *intensity,
            })
            .collect();
        Self { profiles }
    }

    pub fn from_profiles(profiles: Vec<Profile>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if !seen.insert(profile.name()) {
                return Err(ConfigError::DuplicateProfile(profile.name().to_string()));
            }
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    /// Resolve a list of names, failing on the first one that is not in the catalog.
    ///
    /// An empty list selects the default profile.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Profile>, ConfigError> {
        if names.is_empty() {
            return Ok(vec![self.get(DEFAULT_PROFILE)?.clone()]);
        }

        names
            .iter()
            .map(|name| self.get(name.as_ref()).cloned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
