use crate::config::Config;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "brokerdesk=debug,tower_http=info,sqlx=warn";

/// Flushes pending spans on drop
pub struct ObservabilityGuard;

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        shutdown();
    }
}

pub fn init(config: &Config) -> Result<ObservabilityGuard, Box<dyn std::error::Error>> {
    init_tracing(config)?;
    init_metrics(config)?;
    Ok(ObservabilityGuard)
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    // OTLP export only when an endpoint is configured
    match &config.otel_exporter_endpoint {
        Some(endpoint) => {
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

            Registry::default()
                .with(env_filter)
                .with(fmt_layer)
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
        }
        None => Registry::default().with(env_filter).with(fmt_layer).init(),
    }

    Ok(())
}

fn init_metrics(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;

    describe_metrics();
    tracing::info!(
        "Metrics exporter (Prometheus) started on port {}",
        config.metrics_port
    );
    Ok(())
}

fn describe_metrics() {
    metrics::describe_counter!("leads_received_total", "Lead conversations accepted");
    metrics::describe_counter!(
        "broker_assignments_total",
        "Broker assignments by method (automatic or manual)"
    );
    metrics::describe_counter!(
        "broker_assignment_unavailable_total",
        "Assignment attempts that found no broker with capacity"
    );
    metrics::describe_counter!("conversations_completed_total", "Conversations completed");
    metrics::describe_counter!("jobs_processed_total", "Queue jobs processed by outcome");
    metrics::describe_counter!("worker_starts_total", "Background worker starts");
    metrics::describe_counter!(
        "bot_echoes_suppressed_total",
        "Webhook notifications dropped as echoes of our own messages"
    );
    metrics::describe_counter!(
        "conversion_transfers_recommended_total",
        "Conversion checks that recommended a human broker"
    );
}

pub fn shutdown() {
    global::shutdown_tracer_provider();
}
