mod catalog;
mod config;
mod constants;
mod data;
mod error;
pub mod human_duration;

pub use catalog::*;
pub use config::*;
pub use constants::*;
pub use data::*;
pub use error::*;
