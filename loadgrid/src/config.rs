//! Run configuration assembly
use crate::expander::{ExecutorDescriptor, Expander};
use crate::registry::MetricRegistry;
use crate::Error;
use loadgrid_core::{
    Extensions, GlobalVus, Host, Profile, RequestSettings, ScenarioKey, TelemetryExport,
};
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, info};
use uuid::Uuid;

/// The complete description of a run. Built once, read-only afterwards.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    run_id: Uuid,
    no_connection_reuse: bool,
    vus: u32,
    scenarios: BTreeMap<ScenarioKey, ExecutorDescriptor>,
    ext: Extensions,
    #[serde(skip)]
    global: GlobalVus,
    #[serde(skip)]
    settings: RequestSettings,
    #[serde(skip)]
    registry: MetricRegistry,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn global_vus(&self) -> &GlobalVus {
        &self.global
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    pub fn scenarios(&self) -> &BTreeMap<ScenarioKey, ExecutorDescriptor> {
        &self.scenarios
    }

    pub fn telemetry(&self) -> &[TelemetryExport] {
        &self.ext.loadimpact.apm
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }
}

#[derive(Default)]
pub struct RunConfigBuilder {
    hosts: Vec<Host>,
    profiles: Vec<Profile>,
    vus: GlobalVus,
    settings: RequestSettings,
    telemetry: TelemetryExport,
    client: Option<Client>,
}

impl RunConfigBuilder {
    pub fn hosts(mut self, hosts: Vec<Host>) -> Self {
        self.hosts = hosts;
        self
    }

    pub fn profiles(mut self, profiles: Vec<Profile>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn vus(mut self, vus: GlobalVus) -> Self {
        self.vus = vus;
        self
    }

    pub fn scheme(mut self, scheme: &str) -> Self {
        self.settings.scheme = scheme.to_string();
        self
    }

    /// Sleep at the end of every driver iteration.
    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.settings.pacing = pacing;
        self
    }

    pub fn no_connection_reuse(mut self, no_reuse: bool) -> Self {
        self.settings.no_connection_reuse = no_reuse;
        self
    }

    pub fn telemetry(mut self, telemetry: TelemetryExport) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Use a preconfigured HTTP client instead of building one from the settings.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Expand the scenario matrix. Every configuration error surfaces here,
    /// before any request is sent.
    pub fn build(self) -> Result<RunConfig, Error> {
        self.vus.validate()?;

        let client = match self.client {
            Some(client) => client,
            None => http_client(&self.settings)?,
        };

        let mut registry = MetricRegistry::new();
        let scenarios = Expander {
            vus: self.vus,
            settings: &self.settings,
            client: &client,
        }
        .expand(&self.hosts, &self.profiles, &mut registry)?;

        let run_id = Uuid::new_v4();
        info!("Configured run {run_id} with {} scenarios", scenarios.len());

        Ok(RunConfig {
            run_id,
            no_connection_reuse: self.settings.no_connection_reuse,
            vus: self.vus.pre_allocated_vus,
            scenarios,
            ext: Extensions::from(self.telemetry),
            global: self.vus,
            settings: self.settings,
            registry,
        })
    }
}

fn http_client(settings: &RequestSettings) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();
    if settings.no_connection_reuse {
        builder = builder.pool_max_idle_per_host(0);
    }
    builder.build()
}
