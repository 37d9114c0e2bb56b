use crate::{ConfigError, Profile, HOSTNAME_ENV_SUFFIX};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A target service, addressed by DNS name or `ip:port`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Host {
    pub alias: String,
    pub address: String,
}

impl Host {
    pub fn new(alias: &str, address: &str) -> Self {
        Self {
            alias: alias.to_string(),
            address: address.to_string(),
        }
    }

    /// Environment variable that may override this host's address.
    pub fn env_var(&self) -> String {
        format!("{}{HOSTNAME_ENV_SUFFIX}", self.alias.to_uppercase())
    }
}

impl FromStr for Host {
    type Err = ConfigError;

    /// Parse `alias=address`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((alias, address)) if !alias.trim().is_empty() && !address.trim().is_empty() => {
                Ok(Host::new(alias.trim(), address.trim()))
            }
            _ => Err(ConfigError::InvalidHost(s.to_string())),
        }
    }
}

/// Identifies one (host, profile) pairing.
///
/// Rendered as `{host}_{profile}` for executor names and metric series.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenarioKey {
    host: String,
    profile: String,
}

impl ScenarioKey {
    pub fn new(host: &Host, profile: &Profile) -> Self {
        Self {
            host: host.alias.clone(),
            profile: profile.name().to_string(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Series name of the trend recorder tracking `dimension` for this scenario.
    pub fn series_name(&self, dimension: Dimension) -> String {
        format!("custom_{}_{}_{}", self.host, self.profile, dimension)
    }

    /// Tag attached to every sample recorded for `dimension`.
    pub fn sample_tag(&self, dimension: Dimension) -> String {
        format!("{}_{}", self.profile, dimension)
    }
}

impl fmt::Display for ScenarioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.host, self.profile)
    }
}

impl Serialize for ScenarioKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-request timing dimensions tracked as separate series.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    /// Time between sending the request and receiving the response headers.
    Waiting,
    /// Time between sending the request and reading the last body byte.
    Duration,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::Waiting, Dimension::Duration];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Waiting => "waiting",
            Dimension::Duration => "duration",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
