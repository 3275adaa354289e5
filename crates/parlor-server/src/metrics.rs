//! Prometheus metrics recorder and `/metrics` rendering.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::errors::ServerError;

/// Install the Prometheus metrics recorder (global).
///
/// Call once at startup before any metrics are recorded. The returned handle
/// renders `/metrics`.
pub fn install_recorder() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// `WebSocket` upgrades completed (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// `/room` requests turned away (counter, labels: reason).
pub const WS_REJECTIONS_TOTAL: &str = "ws_rejections_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_from_local_recorder() {
        // Local recorder: no global install, so tests don't fight over it.
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!(WS_CONNECTIONS_TOTAL).increment(3);
        });
        assert!(render(&handle).contains("ws_connections_total 3"));
    }

    #[test]
    fn metric_constants_are_snake_case() {
        for name in [WS_CONNECTIONS_TOTAL, WS_REJECTIONS_TOTAL] {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
