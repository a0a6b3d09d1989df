//! Log and trace output.
use miette::{IntoDiagnostic, WrapErr};
use opentelemetry::trace::TracerProvider;
use opentelemetry::InstrumentationScope;
use opentelemetry_resource_detectors::{HostResourceDetector, OsResourceDetector};
use opentelemetry_sdk::resource::{EnvResourceDetector, ResourceDetector};
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TracingConfig;

/// Installs the global subscriber.
///
/// Events are written as JSON to stderr, leaving stdout to the notices meant for the user.
/// `RUST_LOG` takes precedence over the configured filter. Spans are also exported over OTLP
/// when `enabled` is set.
///
/// # Errors
///
/// Fails if the exporter can't be built or a global subscriber is already set.
pub fn try_init(config: &TracingConfig) -> miette::Result<()> {
    let tracer = if config.enabled {
        Some(otlp_tracer()?)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .try_init()
        .into_diagnostic()
        .wrap_err("could not install tracing subscriber")?;

    info!(otlp = config.enabled, filter = %config.filter, "tracing initialized");

    Ok(())
}

fn env_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Builds a tracer that batches spans to the OTLP HTTP endpoint named by the standard
/// `OTEL_EXPORTER_OTLP_*` variables.
fn otlp_tracer() -> miette::Result<SdkTracer> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .build()
        .into_diagnostic()
        .wrap_err("could not build otlp exporter")?;
    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource())
        .build();
    let scope = InstrumentationScope::builder(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .build();

    Ok(provider.tracer_with_scope(scope))
}

/// Describes this process, enriched with whatever the host and `OTEL_RESOURCE_ATTRIBUTES` tell us.
fn resource() -> Resource {
    let detectors: [Box<dyn ResourceDetector>; 3] = [
        Box::new(EnvResourceDetector::default()),
        Box::new(OsResourceDetector),
        Box::new(HostResourceDetector::default()),
    ];

    Resource::builder_empty()
        .with_service_name(env!("CARGO_PKG_NAME"))
        .with_detectors(&detectors)
        .build()
}

