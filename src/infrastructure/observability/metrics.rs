//! Prometheus metrics infrastructure

use std::time::Duration;

use metrics::{Counter, Gauge, Key, KeyName, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;

const REQUEST_COUNT: &str = "request_count";
const REQUEST_LATENCY: &str = "request_latency_seconds";
const RESPONSE_SIZE: &str = "response_size_bytes";
const REQUESTS_IN_PROGRESS: &str = "requests_in_progress";
const EXCEPTIONS_COUNT: &str = "exceptions_count";
const DATABASE_ERRORS: &str = "database_errors_total";
const TASKS_CREATED: &str = "tasks_created_total";
const TASKS_COMPLETED: &str = "tasks_completed_total";

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];
const SIZE_BUCKETS: &[f64] = &[100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0];

const MAX_ENDPOINT_LENGTH: usize = 50;

/// Exception kind that also counts as a database error
const STORAGE_ERROR_KIND: &str = "StorageError";

/// One completed, instrumented request
#[derive(Debug, Clone)]
pub struct RequestSample<'a> {
    pub method: &'a str,
    pub endpoint: &'a str,
    pub status_code: u16,
    pub latency: Duration,
    /// Body size in bytes, when it could be determined
    pub size: Option<u64>,
}

/// Owned Prometheus registry for request and domain metrics
///
/// The recorder is never installed globally, so every instance (one per
/// server, one per test) has its own isolated set of series.
pub struct MetricsRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    in_progress: Gauge,
    database_errors: Counter,
    tasks_created: Counter,
    tasks_completed: Counter,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry").finish_non_exhaustive()
    }
}

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}

fn labels(pairs: &[(&'static str, &str)]) -> Vec<Label> {
    pairs
        .iter()
        .map(|(key, value)| Label::new(*key, value.to_string()))
        .collect()
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, DomainError> {
        let build_error =
            |e: metrics_exporter_prometheus::BuildError| DomainError::configuration(e.to_string());

        let recorder = PrometheusBuilder::new()
            .set_buckets(LATENCY_BUCKETS)
            .map_err(build_error)?
            .set_buckets_for_metric(Matcher::Full(RESPONSE_SIZE.to_string()), SIZE_BUCKETS)
            .map_err(build_error)?
            .build_recorder();

        describe(&recorder);

        let handle = recorder.handle();
        let in_progress = recorder.register_gauge(&Key::from_name(REQUESTS_IN_PROGRESS), &metadata());
        let database_errors =
            recorder.register_counter(&Key::from_name(DATABASE_ERRORS), &metadata());
        let tasks_created = recorder.register_counter(&Key::from_name(TASKS_CREATED), &metadata());
        let tasks_completed =
            recorder.register_counter(&Key::from_name(TASKS_COMPLETED), &metadata());

        // Register at zero so the series are scrapeable from startup.
        in_progress.set(0.0);
        database_errors.absolute(0);
        tasks_created.absolute(0);
        tasks_completed.absolute(0);

        Ok(Self {
            recorder,
            handle,
            in_progress,
            database_errors,
            tasks_created,
            tasks_completed,
        })
    }

    /// Count a request as in flight until the returned guard is dropped
    pub fn start_request(&self) -> InFlightGuard {
        self.in_progress.increment(1.0);
        InFlightGuard {
            gauge: self.in_progress.clone(),
        }
    }

    pub fn record_request(&self, sample: &RequestSample<'_>) {
        let status = sample.status_code.to_string();
        let labels = labels(&[
            ("method", sample.method),
            ("endpoint", sample.endpoint),
            ("status_code", status.as_str()),
        ]);

        self.recorder
            .register_counter(&Key::from_parts(REQUEST_COUNT, labels.clone()), &metadata())
            .increment(1);
        self.recorder
            .register_histogram(&Key::from_parts(REQUEST_LATENCY, labels), &metadata())
            .record(sample.latency.as_secs_f64());

        if let Some(size) = sample.size {
            self.recorder
                .register_histogram(&Key::from_name(RESPONSE_SIZE), &metadata())
                .record(size as f64);
        }
    }

    /// Record an unhandled error that reached the request pipeline
    pub fn record_exception(&self, exception_type: &str, endpoint: &str) {
        let labels = labels(&[("exception_type", exception_type), ("endpoint", endpoint)]);

        self.recorder
            .register_counter(&Key::from_parts(EXCEPTIONS_COUNT, labels), &metadata())
            .increment(1);

        if exception_type == STORAGE_ERROR_KIND {
            self.database_errors.increment(1);
        }
    }

    pub fn record_task_created(&self) {
        self.tasks_created.increment(1);
    }

    pub fn record_task_completed(&self) {
        self.tasks_completed.increment(1);
    }

    /// Render all series in the Prometheus text exposition format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

fn describe(recorder: &PrometheusRecorder) {
    let counters = [
        (REQUEST_COUNT, "Total number of HTTP requests"),
        (EXCEPTIONS_COUNT, "Unhandled errors raised while serving requests"),
        (DATABASE_ERRORS, "Storage failures surfaced to clients"),
        (TASKS_CREATED, "Tasks created"),
        (TASKS_COMPLETED, "Tasks moved from pending to completed"),
    ];
    for (name, help) in counters {
        recorder.describe_counter(KeyName::from(name), None, help.into());
    }

    recorder.describe_histogram(
        KeyName::from(REQUEST_LATENCY),
        None,
        "HTTP request latency in seconds".into(),
    );
    recorder.describe_histogram(
        KeyName::from(RESPONSE_SIZE),
        None,
        "HTTP response body size in bytes".into(),
    );
    recorder.describe_gauge(
        KeyName::from(REQUESTS_IN_PROGRESS),
        None,
        "HTTP requests currently being served".into(),
    );
}

/// Decrements the in-flight gauge when dropped, on every exit path
#[derive(Debug)]
pub struct InFlightGuard {
    gauge: Gauge,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.decrement(1.0);
    }
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .expect("valid uuid regex")
});

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").expect("valid numeric segment regex"));

/// Sanitize URL path for metric labels (remove IDs, limit cardinality)
pub fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "{id}");
    // Applied twice because adjacent numeric segments share a slash.
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(MAX_ENDPOINT_LENGTH).collect()
}

/// Sum every sample of `name` whose labels include all of `labels`
#[cfg(test)]
pub(crate) fn metric_value(rendered: &str, name: &str, labels: &[(&str, &str)]) -> f64 {
    rendered
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            let (series_name, series_labels) = match series.split_once('{') {
                Some((n, rest)) => (n, rest),
                None => (series, ""),
            };

            let matches = series_name == name
                && labels
                    .iter()
                    .all(|(k, v)| series_labels.contains(&format!("{}=\"{}\"", k, v)));

            if matches {
                value.parse::<f64>().ok()
            } else {
                None
            }
        })
        .sum()
}
