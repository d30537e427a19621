// src/metrics.rs
use axum::{routing::get, Router};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::category::FieldCategory;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and return a handle to it.
    pub fn init() -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                PrometheusBuilder::new()
                    .install_recorder()
                    .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))
            })?
            .clone();

        // Register series so they show up before the first fill.
        counter!("autofill_fill_runs_total").increment(0);
        counter!("autofill_fields_filled_total").increment(0);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn record_classification(category: Option<FieldCategory>) {
    let label = category.map(|c| c.key()).unwrap_or("none");
    counter!("autofill_classifications_total", "category" => label).increment(1);
}

pub fn record_fill(filled: usize) {
    counter!("autofill_fill_runs_total").increment(1);
    counter!("autofill_fields_filled_total").increment(filled as u64);
}
