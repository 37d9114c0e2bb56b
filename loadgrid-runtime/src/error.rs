use loadgrid_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] loadgrid::Error),

    #[error("Scenario task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Unable to install the Prometheus exporter: {0}")]
    Exporter(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Unable to serialize the run configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}
