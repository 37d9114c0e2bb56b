pub mod runtime;

mod error;
pub mod hosts;
pub mod report;
mod runner;
pub mod schedule;

pub use crate::error::RuntimeError;
pub use crate::report::{RunReport, ScenarioReport, Summary};
pub use crate::runner::Runner;
pub use crate::runtime::LoadgridRuntime;
