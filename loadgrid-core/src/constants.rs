use std::time::Duration;

/// Virtual users allocated up front for every scenario.
pub const PRE_ALLOCATED_VUS: u32 = 200;

/// Upper bound on virtual users for every scenario.
pub const MAX_VUS: u32 = 200;

/// Period the stage targets are expressed against.
pub const TIME_UNIT: Duration = Duration::from_secs(60);

/// Fixed sleep at the end of every driver iteration.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

pub const DEFAULT_SCHEME: &str = "http";

pub const DEFAULT_HOST_ALIAS: &str = "target";
pub const DEFAULT_HOST_ADDRESS: &str = "target-service.target.svc.cluster.local";

/// Suffix of the environment variable overriding a host address, e.g. `TARGET_HOSTNAME`.
pub const HOSTNAME_ENV_SUFFIX: &str = "_HOSTNAME";

pub const DEFAULT_PROFILE: &str = "highmem";

pub const TELEMETRY_PROVIDER: &str = "prometheus";
pub const TELEMETRY_REMOTE_WRITE_URL: &str =
    "http://prom-kube-prometheus-stack-prometheus.monitoring.svc.cluster.local:9090/api/v1/write";
pub const TELEMETRY_RESAMPLE_RATE: u32 = 3;

/// Name of the response check run by every driver iteration.
pub const CHECK_NAME: &str = "verify homepage text";
