//! Host × profile scenario expansion
use crate::driver::Driver;
use crate::registry::MetricRegistry;
use crate::Error;
use loadgrid_core::{
    ConfigError, Dimension, GlobalVus, Host, Profile, RequestSettings, ScenarioKey, Stage,
};
use reqwest::Client;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

/// Executor type of every expanded scenario.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ExecutorKind {
    #[serde(rename = "ramping-arrival-rate")]
    RampingArrivalRate,
}

/// Everything the runtime needs to schedule one scenario.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorDescriptor {
    pub executor: ExecutorKind,
    pub exec: Driver,
    #[serde(rename = "preAllocatedVUs")]
    pub pre_allocated_vus: u32,
    #[serde(rename = "maxVUs")]
    pub max_vus: u32,
    #[serde(serialize_with = "loadgrid_core::human_duration::serialize")]
    pub time_unit: Duration,
    pub start_rate: u32,
    pub stages: Vec<Stage>,
}

/// Shared inputs for every driver built during expansion.
pub struct Expander<'a> {
    pub vus: GlobalVus,
    pub settings: &'a RequestSettings,
    pub client: &'a Client,
}

impl Expander<'_> {
    /// Pair every host with every profile.
    ///
    /// Recorders for each pair are registered before its driver is bound, so a
    /// driver always finds them. Two pairs rendering to the same key are rejected.
    pub fn expand(
        &self,
        hosts: &[Host],
        profiles: &[Profile],
        registry: &mut MetricRegistry,
    ) -> Result<BTreeMap<ScenarioKey, ExecutorDescriptor>, Error> {
        check_unique_hosts(hosts)?;

        let mut scenarios = BTreeMap::new();
        let mut rendered = HashSet::new();

        for host in hosts {
            for profile in profiles {
                let key = ScenarioKey::new(host, profile);
                if !rendered.insert(key.to_string()) || registry.contains(&key) {
                    return Err(ConfigError::DuplicateScenario(key.to_string()).into());
                }

                registry.register(&key, &Dimension::ALL);
                let recorders = registry.scenario(&key)?;

                let exec = Driver::new(
                    &self.settings.scheme,
                    host,
                    profile,
                    recorders,
                    self.client.clone(),
                    self.settings.pacing,
                )?;
                trace!("Bound {key} to {}", exec.url());

                let descriptor = ExecutorDescriptor {
                    executor: ExecutorKind::RampingArrivalRate,
                    exec,
                    pre_allocated_vus: self.vus.pre_allocated_vus,
                    max_vus: self.vus.max_vus,
                    time_unit: self.vus.time_unit,
                    start_rate: profile.start_rate(),
                    stages: profile.stages().to_vec(),
                };
                scenarios.insert(key, descriptor);
            }
        }

        debug!(
            "Expanded {} hosts x {} profiles into {} scenarios",
            hosts.len(),
            profiles.len(),
            scenarios.len()
        );
        Ok(scenarios)
    }
}

fn check_unique_hosts(hosts: &[Host]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for host in hosts {
        if !seen.insert(host.alias.as_str()) {
            return Err(ConfigError::DuplicateHost(host.alias.clone()));
        }
    }
    Ok(())
}
