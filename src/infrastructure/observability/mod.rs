use crate::config::Config;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Lease decisions at debug, HTTP spans from tower-http alongside them.
const DEFAULT_FILTER: &str = "leasekeeper=debug,tower_http=debug";

/// Keeps the exporters alive for the lifetime of the process.
/// Dropping it flushes pending spans when OTLP export is on.
pub struct ObservabilityGuard {
    otlp: bool,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if self.otlp {
            global::shutdown_tracer_provider();
        }
    }
}

/// Install logging, optional OTLP span export and the optional Prometheus exporter.
pub fn init(config: &Config) -> Result<ObservabilityGuard, Box<dyn std::error::Error>> {
    let tracer = otlp_tracer(config)?;
    let otlp = tracer.is_some();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_target(true);
    let otel_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    if otlp {
        tracing::info!("Exporting spans as '{}' over OTLP", config.service_name);
    }

    init_metrics(config)?;
    Ok(ObservabilityGuard { otlp })
}

fn otlp_tracer(
    config: &Config,
) -> Result<Option<sdktrace::Tracer>, Box<dyn std::error::Error>> {
    let Some(endpoint) = &config.otel_exporter_endpoint else {
        return Ok(None);
    };

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint);

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
            KeyValue::new("service.name", config.service_name.clone()),
        ])))
        .install_batch(runtime::Tokio)?;

    Ok(Some(tracer))
}

fn init_metrics(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = config.metrics_port else {
        tracing::debug!("METRICS_PORT not set, lease metrics are not exported");
        return Ok(());
    };

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()?;
    describe_lease_metrics();

    tracing::info!("Lease metrics served for Prometheus on port {}", port);
    Ok(())
}

fn describe_lease_metrics() {
    metrics::describe_counter!("lease_acquire_total", "Acquire requests by outcome");
    metrics::describe_counter!("lease_renew_total", "Heartbeats by outcome");
    metrics::describe_counter!("lease_release_total", "Release requests by outcome");
    metrics::describe_counter!("lease_expired_total", "Leases evicted by the sweeper");
    metrics::describe_gauge!("lease_active", "Entries currently in the lease table");
}
