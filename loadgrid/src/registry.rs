//! Trend recorders for per-request timings
use loadgrid_core::{ConfigError, Dimension, ScenarioKey};
use metrics::Histogram;
use metrics_util::AtomicBucket;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Append-only series of timing samples, shared by every invocation of one scenario's driver.
///
/// Samples go to the `metrics` histogram named after the series (so whichever
/// exporter is installed sees them) and to a lock-free local bucket used for the
/// end of run report.
#[derive(Clone)]
pub struct TrendRecorder {
    inner: Arc<TrendInner>,
}

struct TrendInner {
    name: String,
    tag: String,
    histogram: Histogram,
    samples: AtomicBucket<f64>,
}

impl TrendRecorder {
    fn new(key: &ScenarioKey, dimension: Dimension) -> Self {
        let name = key.series_name(dimension);
        let tag = key.sample_tag(dimension);

        metrics::describe_histogram!(
            name.clone(),
            metrics::Unit::Milliseconds,
            "Per-request timing for a single scenario"
        );
        let histogram = metrics::histogram!(name.clone(), "tag" => tag.clone());

        Self {
            inner: Arc::new(TrendInner {
                name,
                tag,
                histogram,
                samples: AtomicBucket::new(),
            }),
        }
    }

    /// Append one sample, in milliseconds.
    pub fn add(&self, value: Duration) {
        let ms = value.as_nanos() as f64 / 1e6;
        self.inner.histogram.record(ms);
        self.inner.samples.push(ms);
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    /// Snapshot of every sample recorded so far, in milliseconds.
    pub fn samples(&self) -> Vec<f64> {
        self.inner.samples.data()
    }

    pub fn same_handle(&self, other: &TrendRecorder) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for TrendRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrendRecorder")
            .field("name", &self.inner.name)
            .field("tag", &self.inner.tag)
            .finish()
    }
}

/// The recorders of a single scenario, handed to its driver by value.
#[derive(Clone, Debug)]
pub struct ScenarioRecorders {
    pub waiting: TrendRecorder,
    pub duration: TrendRecorder,
}

impl ScenarioRecorders {
    pub fn get(&self, dimension: Dimension) -> &TrendRecorder {
        match dimension {
            Dimension::Waiting => &self.waiting,
            Dimension::Duration => &self.duration,
        }
    }
}

/// Every trend recorder of a run, keyed by (scenario, dimension).
#[derive(Default, Debug)]
pub struct MetricRegistry {
    recorders: BTreeMap<(ScenarioKey, Dimension), TrendRecorder>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one recorder per dimension for `key`. Dimensions already registered are left alone.
    pub fn register(&mut self, key: &ScenarioKey, dimensions: &[Dimension]) {
        for dimension in dimensions {
            self.recorders
                .entry((key.clone(), *dimension))
                .or_insert_with(|| {
                    trace!("Registering {} for {key}", key.series_name(*dimension));
                    TrendRecorder::new(key, *dimension)
                });
        }
    }

    pub fn lookup(
        &self,
        key: &ScenarioKey,
        dimension: Dimension,
    ) -> Result<&TrendRecorder, ConfigError> {
        self.recorders
            .get(&(key.clone(), dimension))
            .ok_or_else(|| ConfigError::MissingRecorder {
                scenario: key.to_string(),
                dimension: dimension.to_string(),
            })
    }

    /// Both tracked recorders for `key`, ready to be moved into a driver.
    pub fn scenario(&self, key: &ScenarioKey) -> Result<ScenarioRecorders, ConfigError> {
        Ok(ScenarioRecorders {
            waiting: self.lookup(key, Dimension::Waiting)?.clone(),
            duration: self.lookup(key, Dimension::Duration)?.clone(),
        })
    }

    pub fn contains(&self, key: &ScenarioKey) -> bool {
        Dimension::ALL
            .iter()
            .any(|d| self.recorders.contains_key(&(key.clone(), *d)))
    }

    pub fn len(&self) -> usize {
        self.recorders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorders.is_empty()
    }
}
