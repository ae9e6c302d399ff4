//! Operation instrumentation and Prometheus metrics.
//!
//! `Monitor` wraps async operations (bookings, payment captures, token refreshes)
//! with timing, outcome counting and failure logging. The Prometheus recorder is
//! process-global, so it is installed at most once and shared by every `Monitor`.

use log::*;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt::Debug;
use std::future::Future;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static PROMETHEUS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

#[derive(Clone, Default)]
pub struct Monitor {
    handle: Option<PrometheusHandle>,
}

impl Monitor {
    /// Creates a monitor, installing the global Prometheus recorder on first use when
    /// `enabled` is true. A recorder that fails to install leaves metrics disabled.
    pub fn new(enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let handle = PROMETHEUS_HANDLE.get_or_init(|| match PrometheusBuilder::new()
            .install_recorder()
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to install Prometheus recorder, metrics disabled: {e}");
                None
            }
        });

        Self {
            handle: handle.clone(),
        }
    }

    pub fn disabled() -> Self {
        Self { handle: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    /// Renders the Prometheus text exposition, if metrics are enabled.
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(|h| h.render())
    }

    /// Runs `operation`, recording its duration and outcome. Errors are logged and
    /// returned unchanged to the caller.
    pub async fn instrument<F, T, E>(&self, operation: &'static str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Debug,
    {
        debug!("Starting operation {operation}");
        let start = Instant::now();

        let result = fut.await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => {
                debug!("Operation {operation} finished in {}ms", elapsed.as_millis());
                record_operation(operation, Outcome::Success, elapsed);
            }
            Err(e) => {
                warn!(
                    "Operation {operation} failed after {}ms: {e:?}",
                    elapsed.as_millis()
                );
                record_operation(operation, Outcome::Failure, elapsed);
            }
        }

        result
    }
}

pub fn record_operation(operation: &'static str, outcome: Outcome, duration: Duration) {
    counter!(
        "operation_total",
        "operation" => operation,
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        "operation_duration_seconds",
        "operation" => operation,
        "outcome" => outcome.as_str()
    )
    .record(duration.as_secs_f64());
}

pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels() {
        assert_eq!(Outcome::Success.as_str(), "success");
        assert_eq!(Outcome::Failure.as_str(), "failure");
    }

    #[test]
    fn disabled_monitor_renders_nothing() {
        let monitor = Monitor::disabled();
        assert!(!monitor.is_enabled());
        assert!(monitor.render().is_none());
    }

    #[tokio::test]
    async fn instrument_passes_through_success() {
        let monitor = Monitor::disabled();
        let result: Result<u32, String> = monitor.instrument("test_ok", async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn instrument_passes_through_failure() {
        let monitor = Monitor::disabled();
        let result: Result<u32, String> = monitor
            .instrument("test_err", async { Err("boom".to_string()) })
            .await;
        assert_eq!(result, Err("boom".to_string()));
    }
}
