//! Logging and trace export
//!
//! [`Telemetry`] is built once at startup and passed to the router builder.
//! It owns three concerns:
//!
//! - the global `tracing` subscriber (env filter plus a pretty or JSON `fmt`
//!   layer)
//! - an optional OTLP span exporter, enabled by `OTEL_EXPORTER_OTLP_ENDPOINT`
//! - the per-request `TraceLayer`
//!
//! Collector credentials are not part of [`TelemetryConfig`]; the exporter
//! reads `OTEL_EXPORTER_OTLP_HEADERS` itself.

use anyhow::{Context, Result};
use axum::Router;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace::Tracer, Resource};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, TelemetryConfig};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "tasky_api=debug,tasky_shared=debug,tower_http=debug";

/// Handle to the installed telemetry pipeline
#[derive(Debug)]
pub struct Telemetry {
    request_tracing: bool,
    exporting: bool,
}

impl Telemetry {
    /// Installs the global subscriber and, when configured, the OTLP exporter
    ///
    /// # Errors
    ///
    /// Returns an error if the exporter pipeline cannot be built or a global
    /// subscriber is already installed.
    pub fn init(config: &TelemetryConfig) -> Result<Self> {
        let tracer = match &config.otlp_endpoint {
            Some(endpoint) => Some(install_tracer(endpoint, &config.service_name)?),
            None => None,
        };
        let exporting = tracer.is_some();

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let registry = tracing_subscriber::registry().with(env_filter);

        match config.log_format {
            LogFormat::Pretty => registry
                .with(tracing_subscriber::fmt::layer())
                .with(tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t)))
                .try_init(),
            LogFormat::Json => registry
                .with(tracing_subscriber::fmt::layer().json())
                .with(tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t)))
                .try_init(),
        }
        .context("failed to initialise tracing subscriber")?;

        if let Some(endpoint) = &config.otlp_endpoint {
            tracing::info!(endpoint = %endpoint, service = %config.service_name, "Exporting spans over OTLP");
        }

        Ok(Self {
            request_tracing: config.request_tracing,
            exporting,
        })
    }

    /// Telemetry that installs nothing and adds no layers
    ///
    /// Used by tests, which build many routers in one process.
    pub fn disabled() -> Self {
        Self {
            request_tracing: false,
            exporting: false,
        }
    }

    /// Wraps every request in a tracing span when request tracing is on
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if !self.request_tracing {
            return router;
        }

        router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    }

    /// Flushes pending spans
    pub fn shutdown(self) {
        if self.exporting {
            tracing::info!("Flushing exported spans");
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

fn install_tracer(endpoint: &str, service_name: &str) -> Result<Tracer> {
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default().with_resource(service_resource(service_name)),
        )
        .install_batch(runtime::Tokio)
        .context("failed to install OTLP tracing pipeline")
}

fn service_resource(service_name: &str) -> Resource {
    Resource::new(vec![
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            service_name.to_string(),
        ),
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
            env!("CARGO_PKG_VERSION"),
        ),
    ])
}
