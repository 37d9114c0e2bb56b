//! Per-scenario request driver
use crate::registry::ScenarioRecorders;
use crate::Error;
use loadgrid_core::{Dimension, Host, Profile, ScenarioKey, CHECK_NAME};
use reqwest::{Client, StatusCode};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, trace, warn};
use url::Url;

/// Pass/fail tally of the response check for one scenario.
#[derive(Debug, Default)]
pub struct Checks {
    passed: AtomicU64,
    failed: AtomicU64,
}

impl Checks {
    pub fn passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn tally(&self, key: &ScenarioKey, ok: bool) {
        let scenario = key.to_string();
        if ok {
            self.passed.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("checks_passed", "scenario" => scenario, "check" => CHECK_NAME)
                .increment(1);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("checks_failed", "scenario" => scenario, "check" => CHECK_NAME)
                .increment(1);
        }
    }
}

/// What came back from a single request, successful or not.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub status: Option<StatusCode>,
    pub body: String,
    pub waiting: Duration,
    pub duration: Duration,
    pub error: Option<String>,
}

impl Outcome {
    pub fn timing(&self, dimension: Dimension) -> Duration {
        match dimension {
            Dimension::Waiting => self.waiting,
            Dimension::Duration => self.duration,
        }
    }
}

/// The entry point bound to one scenario. Cheap to clone; every clone shares
/// the same recorders and check tally.
#[derive(Clone)]
pub struct Driver {
    inner: Arc<DriverInner>,
}

struct DriverInner {
    key: ScenarioKey,
    profile: String,
    url: Url,
    recorders: ScenarioRecorders,
    checks: Checks,
    client: Client,
    pacing: Duration,
}

impl Driver {
    /// Bind a driver for `profile` against `host`. Everything the driver needs is
    /// captured here, nothing is looked up at request time.
    pub fn new(
        scheme: &str,
        host: &Host,
        profile: &Profile,
        recorders: ScenarioRecorders,
        client: Client,
        pacing: Duration,
    ) -> Result<Self, Error> {
        let url = target_url(scheme, host, profile)?;

        Ok(Self {
            inner: Arc::new(DriverInner {
                key: ScenarioKey::new(host, profile),
                profile: profile.name().to_string(),
                url,
                recorders,
                checks: Checks::default(),
                client,
                pacing,
            }),
        })
    }

    pub fn key(&self) -> &ScenarioKey {
        &self.inner.key
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn recorders(&self) -> &ScenarioRecorders {
        &self.inner.recorders
    }

    pub fn checks(&self) -> &Checks {
        &self.inner.checks
    }

    pub fn pacing(&self) -> Duration {
        self.inner.pacing
    }

    /// One iteration: request, check, record both timings, then pace.
    ///
    /// A failed check never cuts the iteration short.
    pub async fn run(&self) -> Outcome {
        let outcome = self.fetch().await;

        let ok = self.check(&outcome);
        self.inner.checks.tally(&self.inner.key, ok);

        for dimension in Dimension::ALL {
            self.inner
                .recorders
                .get(dimension)
                .add(outcome.timing(dimension));
        }

        tokio::time::sleep(self.inner.pacing).await;
        outcome
    }

    async fn fetch(&self) -> Outcome {
        let start = Instant::now();
        let res = match self.inner.client.get(self.inner.url.clone()).send().await {
            Ok(res) => res,
            Err(err) => {
                let elapsed = start.elapsed();
                debug!("Request to {} failed: {err}", self.inner.url);
                return Outcome {
                    status: None,
                    body: String::new(),
                    waiting: elapsed,
                    duration: elapsed,
                    error: Some(err.to_string()),
                };
            }
        };

        let waiting = start.elapsed();
        let status = res.status();
        let (body, error) = match res.text().await {
            Ok(body) => (body, None),
            Err(err) => (String::new(), Some(err.to_string())),
        };

        Outcome {
            status: Some(status),
            body,
            waiting,
            duration: start.elapsed(),
            error,
        }
    }

    fn check(&self, outcome: &Outcome) -> bool {
        let status_ok = outcome.status.is_some_and(|s| s.is_success());
        let ok = status_ok && outcome.body.contains(&self.inner.profile);

        if !ok {
            warn!(
                scenario = %self.inner.key,
                status = ?outcome.status,
                error = outcome.error.as_deref(),
                "Check `{CHECK_NAME}` failed",
            );
        }
        ok
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("key", &self.inner.key)
            .field("url", &self.inner.url.as_str())
            .field("pacing", &self.inner.pacing)
            .finish()
    }
}

/// Drivers are referenced by scenario key in a serialized configuration.
impl Serialize for Driver {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.inner.key)
    }
}

/// `{scheme}://{address}/{profile}?count={intensity}`
pub fn target_url(scheme: &str, host: &Host, profile: &Profile) -> Result<Url, Error> {
    let base = format!("{scheme}://{}/", host.address);
    let mut url = Url::parse(&base).map_err(|source| Error::Url {
        address: host.address.clone(),
        source,
    })?;

    url.set_path(profile.name());
    url.query_pairs_mut()
        .append_pair("count", &profile.intensity().to_string());

    Ok(url)
}
