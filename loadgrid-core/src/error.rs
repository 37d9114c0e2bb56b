use thiserror::Error;

/// Problems found while assembling a run. All of them are fatal: nothing is
/// sent to a target once one of these has been returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown profile `{0}`")]
    UnknownProfile(String),

    #[error("Profile `{0}` has no stages")]
    EmptyStages(String),

    #[error("Profile `{0}` is defined more than once")]
    DuplicateProfile(String),

    #[error("Host alias `{0}` is defined more than once")]
    DuplicateHost(String),

    #[error("Invalid host `{0}`, expected `alias=address`")]
    InvalidHost(String),

    #[error("Scenario key `{0}` is produced by more than one host/profile pair")]
    DuplicateScenario(String),

    #[error("No `{dimension}` recorder registered for scenario `{scenario}`")]
    MissingRecorder { scenario: String, dimension: String },

    #[error("Invalid virtual user bounds: preAllocatedVUs={pre_allocated}, maxVUs={max}")]
    InvalidVus { pre_allocated: u32, max: u32 },
}
