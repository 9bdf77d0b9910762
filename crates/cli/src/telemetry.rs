//! Tracing subscriber and OpenTelemetry exporter set-up.

use anyhow::Context;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::env_var;

/// Handle that flushes exported spans on shutdown.
#[must_use = "call shutdown() before exiting to flush exported spans"]
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Flushes and stops the span exporter, if one was started.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(e) = provider.shutdown() {
                tracing::warn!(error = %e, "failed to shut down span exporter");
            }
        }
    }
}

/// Installs the global subscriber for `service_name`.
///
/// - `RUST_LOG` selects levels (default `info`).
/// - `LOG_FORMAT=json` switches to JSON lines.
/// - `OTEL_EXPORTER_OTLP_ENDPOINT` enables OTLP span export over gRPC.
///
/// Must be called from within a Tokio runtime.
pub fn init(service_name: &'static str) -> anyhow::Result<Telemetry> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env_var("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let provider = match env_var("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|e| !e.is_empty()) {
        Some(endpoint) => Some(otlp_provider(service_name, &endpoint)?),
        None => None,
    };
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer(service_name)));

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(p) = &provider {
        opentelemetry::global::set_tracer_provider(p.clone());
    }

    tracing::info!(service = service_name, otlp = provider.is_some(), "telemetry initialised");
    Ok(Telemetry { provider })
}

fn otlp_provider(service_name: &'static str, endpoint: &str) -> anyhow::Result<TracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .context("failed to build OTLP span exporter")?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new([KeyValue::new("service.name", service_name)]))
        .build())
}
