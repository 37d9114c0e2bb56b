use loadgrid_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid target URL for host `{address}`: {source}")]
    Url {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unable to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
