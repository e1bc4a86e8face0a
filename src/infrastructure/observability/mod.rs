//! Observability infrastructure - Prometheus metrics registry

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{sanitize_path, InFlightGuard, MetricsRegistry, RequestSample};

#[cfg(test)]
pub(crate) use metrics::metric_value;
