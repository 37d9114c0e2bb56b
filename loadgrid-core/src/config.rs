use crate::{
    ConfigError, DEFAULT_PACING, DEFAULT_SCHEME, MAX_VUS, PRE_ALLOCATED_VUS, TELEMETRY_PROVIDER,
    TELEMETRY_REMOTE_WRITE_URL, TELEMETRY_RESAMPLE_RATE, TIME_UNIT,
};
use serde::Serialize;
use std::time::Duration;

/// Virtual-user bounds shared by every scenario.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlobalVus {
    pub pre_allocated_vus: u32,
    pub max_vus: u32,
    pub time_unit: Duration,
}

impl GlobalVus {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_vus == 0 || self.pre_allocated_vus > self.max_vus {
            return Err(ConfigError::InvalidVus {
                pre_allocated: self.pre_allocated_vus,
                max: self.max_vus,
            });
        }
        Ok(())
    }
}

impl Default for GlobalVus {
    fn default() -> Self {
        Self {
            pre_allocated_vus: PRE_ALLOCATED_VUS,
            max_vus: MAX_VUS,
            time_unit: TIME_UNIT,
        }
    }
}

/// Per-request behaviour shared by every driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestSettings {
    pub scheme: String,
    pub pacing: Duration,
    pub no_connection_reuse: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            pacing: DEFAULT_PACING,
            no_connection_reuse: true,
        }
    }
}

/// Remote-write metrics sink settings. Not interpreted here, only passed through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryExport {
    pub provider: String,
    #[serde(rename = "remoteWriteURL")]
    pub remote_write_url: String,
    pub include_default_metrics: bool,
    pub include_test_run_id: bool,
    pub resample_rate: u32,
}

impl Default for TelemetryExport {
    fn default() -> Self {
        Self {
            provider: TELEMETRY_PROVIDER.to_string(),
            remote_write_url: TELEMETRY_REMOTE_WRITE_URL.to_string(),
            include_default_metrics: true,
            include_test_run_id: true,
            resample_rate: TELEMETRY_RESAMPLE_RATE,
        }
    }
}

/// The `ext` block of a run configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Extensions {
    pub loadimpact: LoadImpact,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadImpact {
    pub apm: Vec<TelemetryExport>,
}

impl From<TelemetryExport> for Extensions {
    fn from(export: TelemetryExport) -> Self {
        Self {
            loadimpact: LoadImpact { apm: vec![export] },
        }
    }
}
