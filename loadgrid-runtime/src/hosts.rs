//! Target host resolution
use loadgrid_core::{ConfigError, Host, DEFAULT_HOST_ADDRESS, DEFAULT_HOST_ALIAS};
use std::collections::HashSet;
#[allow(unused_imports)]
use tracing::{debug, info};

pub fn default_hosts() -> Vec<Host> {
    vec![Host::new(DEFAULT_HOST_ALIAS, DEFAULT_HOST_ADDRESS)]
}

/// Final host set for a run.
///
/// Default hosts take their address from `{ALIAS}_HOSTNAME` when `env` has it.
/// Hosts given explicitly replace a default with the same alias, or are added.
pub fn resolve<F>(explicit: &[Host], env: F) -> Result<Vec<Host>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut hosts = default_hosts();
    for host in &mut hosts {
        if let Some(address) = env(&host.env_var()).filter(|a| !a.trim().is_empty()) {
            debug!("{} overridden to {address}", host.env_var());
            host.address = address.trim().to_string();
        }
    }

    let mut seen = HashSet::new();
    for host in explicit {
        if !seen.insert(host.alias.as_str()) {
            return Err(ConfigError::DuplicateHost(host.alias.clone()));
        }

        match hosts.iter_mut().find(|h| h.alias == host.alias) {
            Some(existing) => existing.address = host.address.clone(),
            None => hosts.push(host.clone()),
        }
    }

    Ok(hosts)
}

/// [`resolve`] against the process environment.
pub fn from_env(explicit: &[Host]) -> Result<Vec<Host>, ConfigError> {
    resolve(explicit, |name| std::env::var(name).ok())
}
