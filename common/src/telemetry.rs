// Telemetry module for structured logging, metrics, and tracing

use anyhow::Result;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{RandomIdGenerator, Sampler, TracerProvider},
    Resource,
};
use std::net::SocketAddr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const SERVICE_NAME: &str = "campus-notice-scheduler";

/// Initialize structured logging with JSON formatting and trace context
///
/// `RUST_LOG` wins over `log_level` when set. An empty or absent
/// `tracing_endpoint` disables the OpenTelemetry layer.
#[tracing::instrument(skip_all)]
pub fn init_logging(log_level: &str, tracing_endpoint: Option<&str>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))?;

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(env_filter);

    let registry = tracing_subscriber::registry().with(json_layer);
    let tracing_endpoint = tracing_endpoint.filter(|endpoint| !endpoint.is_empty());

    if let Some(endpoint) = tracing_endpoint {
        let tracer = init_tracer(endpoint)?;
        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        registry
            .with(telemetry_layer)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    } else {
        registry
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;
    }

    tracing::info!(
        log_level = log_level,
        tracing_endpoint = tracing_endpoint,
        "Structured logging initialized"
    );

    Ok(())
}

/// Initialize OpenTelemetry tracer with OTLP exporter
#[tracing::instrument(skip_all)]
fn init_tracer(endpoint: &str) -> Result<opentelemetry_sdk::trace::Tracer> {
    use opentelemetry_sdk::runtime::Tokio;

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .build_span_exporter()
        .map_err(|e| anyhow::anyhow!("Failed to build span exporter: {}", e))?;

    let tracer_provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .with_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(Resource::new(vec![
                    KeyValue::new("service.name", SERVICE_NAME),
                    KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                ])),
        )
        .build();

    global::set_tracer_provider(tracer_provider.clone());
    let tracer = tracer_provider.tracer(SERVICE_NAME);

    tracing::info!(endpoint = endpoint, "OpenTelemetry tracer initialized");

    Ok(tracer)
}

/// Flush remaining spans on shutdown
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

/// Initialize Prometheus metrics exporter
///
/// Registers:
/// - notice_new_total: items inserted for the first time
/// - notice_duplicate_total: items already present in the store
/// - notice_delivery_failed_total: pushes that failed after insertion
/// - crawl_runs_total: finished crawl runs by outcome
/// - notice_purged_total: rows removed by purges
/// - notice_risk_window_seconds: time from insert to delivered push
#[tracing::instrument(skip_all)]
pub fn init_metrics(metrics_port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", metrics_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid metrics port: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    describe_counter!("notice_new_total", "Items inserted for the first time");
    describe_counter!(
        "notice_duplicate_total",
        "Items skipped because they were already stored"
    );
    describe_counter!(
        "notice_delivery_failed_total",
        "Pushes that failed for newly stored items"
    );
    describe_counter!("crawl_runs_total", "Finished crawl runs by outcome");
    describe_counter!("notice_purged_total", "Rows removed by purges");
    describe_histogram!(
        "notice_risk_window_seconds",
        "Time between persisting an item and delivering its push"
    );

    tracing::info!(
        metrics_port = metrics_port,
        metrics_endpoint = format!("http://0.0.0.0:{}/metrics", metrics_port),
        "Prometheus metrics exporter initialized"
    );

    Ok(())
}

#[inline]
pub fn record_notice_new(family: &str, category: &str) {
    counter!("notice_new_total", "family" => family.to_string(), "category" => category.to_string())
        .increment(1);
}

#[inline]
pub fn record_notice_duplicate(family: &str, category: &str) {
    counter!("notice_duplicate_total", "family" => family.to_string(), "category" => category.to_string())
        .increment(1);
}

#[inline]
pub fn record_delivery_failure(family: &str, category: &str) {
    counter!(
        "notice_delivery_failed_total",
        "family" => family.to_string(),
        "category" => category.to_string()
    )
    .increment(1);
}

/// Outcome is one of `completed`, `fetch_failed`, `aborted`
#[inline]
pub fn record_crawl_run(family: &str, outcome: &'static str) {
    counter!("crawl_runs_total", "family" => family.to_string(), "outcome" => outcome)
        .increment(1);
}

#[inline]
pub fn record_notices_purged(family: &str, count: u64) {
    counter!("notice_purged_total", "family" => family.to_string()).increment(count);
}

#[inline]
pub fn record_risk_window(family: &str, seconds: f64) {
    histogram!("notice_risk_window_seconds", "family" => family.to_string()).record(seconds);
}
