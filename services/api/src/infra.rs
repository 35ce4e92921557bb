use admissions::config::{validate_url, ConfigError};
use admissions::stats::{DatasetSource, StatsClient};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) stats: Arc<StatsClient>,
}

/// Picks the location for one period: an explicit file, an explicit URL,
/// or the configured endpoint, in that order.
pub(crate) fn resolve_source(
    variable: &'static str,
    url: Option<String>,
    file: Option<PathBuf>,
    configured: &str,
) -> Result<DatasetSource, ConfigError> {
    if let Some(path) = file {
        return Ok(DatasetSource::File(path));
    }

    match url {
        Some(url) => validate_url(variable, url).map(DatasetSource::Remote),
        None => Ok(DatasetSource::Remote(configured.to_string())),
    }
}

/// Thousands-separated head count, e.g. `12,345`.
pub(crate) fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
