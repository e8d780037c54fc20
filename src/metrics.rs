use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Fails if a recorder is already installed.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register series so they appear even before the first increment.
    for result in ["WIN", "LOSS"] {
        counter!("positions_settled_total", "result" => result).absolute(0);
    }
    for mode in ["reset", "append"] {
        counter!("session_control_pushes_total", "mode" => mode).absolute(0);
    }
    for kind in ["add", "subtract"] {
        counter!("balance_adjustments_total", "type" => kind).absolute(0);
    }
    gauge!("session_queue_depth").set(0.0);

    Ok(handle)
}
