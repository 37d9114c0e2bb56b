//! Command line entry point
//!
//! Resolves hosts and profiles, assembles the run configuration (failing before
//! any traffic on a configuration error) and hands it to the [`Runner`].
use crate::{hosts, report::RunReport, runner::Runner, RuntimeError};
use clap::Parser;
use loadgrid::RunConfig;
use loadgrid_core::{Catalog, Host, DEFAULT_PACING, DEFAULT_SCHEME};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, instrument};

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "loadgrid=info,loadgrid_runtime=info";

#[derive(Parser, Debug)]
#[command(version, about = "Drive a host x profile matrix of ramping load scenarios")]
struct LoadgridCli {
    /// Load profile to run, repeatable. Defaults to `highmem`.
    #[arg(short, long = "profile")]
    profiles: Vec<String>,

    /// Extra or replacement target as `alias=address`, repeatable.
    #[arg(long = "host")]
    hosts: Vec<Host>,

    #[arg(long, default_value = DEFAULT_SCHEME)]
    scheme: String,

    /// Stop every scenario after this long, e.g. `90s`.
    #[arg(short, long, value_parser = humantime::parse_duration)]
    duration: Option<Duration>,

    /// Sleep after each request, e.g. `1s` or `250ms`.
    #[arg(long, value_parser = humantime::parse_duration)]
    pacing: Option<Duration>,

    /// Print the run configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,

    /// Serve Prometheus metrics on this address while running.
    #[arg(long)]
    metrics_addr: Option<SocketAddr>,
}

/// Runs the scenario matrix described by its settings.
///
/// # Example
///
/// ```no_run
/// use loadgrid_runtime::LoadgridRuntime;
///
/// #[tokio::main]
/// async fn main() -> Result<(), loadgrid_runtime::RuntimeError> {
///     LoadgridRuntime::new().with_args().run().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct LoadgridRuntime {
    profiles: Vec<String>,
    hosts: Vec<Host>,
    scheme: String,
    duration: Option<Duration>,
    pacing: Duration,
    print_config: bool,
    metrics_addr: Option<SocketAddr>,
    runner: Runner,
}

impl Default for LoadgridRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadgridRuntime {
    pub fn new() -> Self {
        Self {
            profiles: vec![],
            hosts: vec![],
            scheme: DEFAULT_SCHEME.to_string(),
            duration: None,
            pacing: DEFAULT_PACING,
            print_config: false,
            metrics_addr: None,
            runner: Runner::new(),
        }
    }

    /// Apply the command line arguments.
    ///
    /// ```text
    /// $ loadgrid -p highmem -p highcpu --host base=without.example.com
    /// $ TARGET_HOSTNAME=127.0.0.1:3002 loadgrid --duration 10s --pacing 100ms
    /// $ loadgrid --print-config
    /// ```
    pub fn with_args(self) -> Self {
        self.apply(LoadgridCli::parse())
    }

    fn apply(mut self, args: LoadgridCli) -> Self {
        self.profiles = args.profiles;
        self.hosts = args.hosts;
        self.scheme = args.scheme;
        self.duration = args.duration;
        if let Some(pacing) = args.pacing {
            self.pacing = pacing;
        }
        self.print_config = args.print_config;
        self.metrics_addr = args.metrics_addr;
        self
    }

    pub fn profiles(mut self, profiles: &[&str]) -> Self {
        self.profiles = profiles.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn hosts(mut self, hosts: &[Host]) -> Self {
        self.hosts = hosts.to_vec();
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn runner(mut self, runner: Runner) -> Self {
        self.runner = runner;
        self
    }

    /// Assemble the run configuration from the process environment and settings.
    pub fn config(&self) -> Result<RunConfig, RuntimeError> {
        let hosts = hosts::from_env(&self.hosts)?;
        let profiles = Catalog::builtin().select(self.profiles.as_slice())?;

        let config = RunConfig::builder()
            .hosts(hosts)
            .profiles(profiles)
            .scheme(&self.scheme)
            .pacing(self.pacing)
            .build()?;
        Ok(config)
    }

    /// Returns `None` when only the configuration was printed.
    #[instrument(name = "loadgrid", skip_all)]
    pub async fn run(self) -> Result<Option<RunReport>, RuntimeError> {
        let config = self.config()?;

        if self.print_config {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(None);
        }

        if let Some(addr) = self.metrics_addr {
            PrometheusBuilder::new().with_http_listener(addr).install()?;
            info!("Serving metrics on {addr}");
        }

        let vus = config.global_vus();
        let settings = config.settings();
        info!(
            "Run {}: {}..{} VUs per host, {} requests paced by {:?}",
            config.run_id(),
            vus.pre_allocated_vus,
            vus.max_vus,
            settings.scheme,
            settings.pacing
        );
        for sink in config.telemetry() {
            info!("Exporting to {} at {}", sink.provider, sink.remote_write_url);
        }

        for (key, scenario) in config.scenarios() {
            debug!("{key} -> {}", scenario.exec.url());
        }

        let report = self
            .runner
            .clone()
            .max_duration(self.duration)
            .run(&config)
            .await?;
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgrid_core::ConfigError;

    fn parse(args: &[&str]) -> LoadgridRuntime {
        let argv = std::iter::once("loadgrid").chain(args.iter().copied());
        let args = LoadgridCli::try_parse_from(argv).unwrap();
        LoadgridRuntime::new().apply(args)
    }

    #[test]
    fn defaults() {
        let rt = parse(&[]);
        assert!(rt.profiles.is_empty());
        assert!(rt.hosts.is_empty());
        assert_eq!(rt.scheme, "http");
        assert_eq!(rt.pacing, Duration::from_secs(1));
        assert!(!rt.print_config);
    }

    #[test]
    fn parses_flags() {
        let rt = parse(&[
            "-p",
            "highmem",
            "--profile",
            "highcpu",
            "--host",
            "base=without.example.com",
            "--duration",
            "90s",
            "--pacing",
            "250ms",
            "--print-config",
        ]);
        assert_eq!(rt.profiles, ["highmem", "highcpu"]);
        assert_eq!(rt.hosts, [Host::new("base", "without.example.com")]);
        assert_eq!(rt.duration, Some(Duration::from_secs(90)));
        assert_eq!(rt.pacing, Duration::from_millis(250));
        assert!(rt.print_config);
    }

    #[test]
    fn malformed_host_is_rejected() {
        let res = LoadgridCli::try_parse_from(["loadgrid", "--host", "nonsense"]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_profile_fails_configuration() {
        let rt = LoadgridRuntime::new()
            .profiles(&["highmem", "nope"])
            .hosts(&[Host::new("target", "127.0.0.1:1")]);
        let err = rt.config().unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::UnknownProfile(ref name)) if name == "nope"
        ));
    }

    #[test]
    fn config_uses_resolved_hosts() {
        let config = LoadgridRuntime::new()
            .profiles(&["highmem", "lowload"])
            .hosts(&[Host::new("target", "127.0.0.1:1"), Host::new("base", "b.local")])
            .config()
            .unwrap();

        let keys: Vec<_> = config.scenarios().keys().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            ["base_highmem", "base_lowload", "target_highmem", "target_lowload"]
        );
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    #[ntest::timeout(20_000)]
    async fn run_logs_settings_and_telemetry() {
        let report = LoadgridRuntime::new()
            .profiles(&["highmem"])
            .hosts(&[Host::new("target", "127.0.0.1:1")])
            .pacing(Duration::ZERO)
            .duration(Duration::from_millis(300))
            .run()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.scenarios.len(), 1);
        assert!(logs_contain("200..200 VUs per host, http requests paced by 0ns"));
        assert!(logs_contain("Exporting to prometheus at"));
    }
}
