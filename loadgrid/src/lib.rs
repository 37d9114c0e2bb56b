#![doc = include_str!("../README.md")]

pub mod config;
pub mod driver;
mod error;
pub mod expander;
pub mod registry;

pub use config::{RunConfig, RunConfigBuilder};
pub use driver::{Checks, Driver, Outcome};
pub use error::Error;
pub use expander::{ExecutorDescriptor, ExecutorKind, Expander};
pub use registry::{MetricRegistry, ScenarioRecorders, TrendRecorder};

#[doc(hidden)]
pub use loadgrid_core as core;

pub mod prelude {
    pub use crate::config::RunConfig;
    pub use crate::driver::Driver;
    pub use crate::registry::MetricRegistry;
    pub use loadgrid_core::{
        Catalog, ConfigError, Dimension, GlobalVus, Host, Profile, ScenarioKey, Stage,
        TelemetryExport,
    };
}
