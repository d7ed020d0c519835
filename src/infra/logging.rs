//! For setting up logging.

use super::config::LoggingConfig;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace, Resource};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    layer::SubscriberExt, registry::Registry, util::SubscriberInitExt, EnvFilter, Layer,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes logs upon being dropped.
#[derive(Debug)]
pub struct LogGuard {
    _guards: Vec<WorkerGuard>,
    otlp: bool,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if self.otlp {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let directive = std::env::var("RUST_LOG").unwrap_or_else(|_| config.filter.clone());
    EnvFilter::new(directive)
}

/// Initializes logging.
///
/// Must be called from within a tokio runtime when an OTLP endpoint is configured.
pub fn init_logging(config: &LoggingConfig) -> color_eyre::Result<LogGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guards = Vec::new();

    let (non_blocking_stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);
    let stdout = tracing_subscriber::fmt::layer().with_writer(non_blocking_stdout);
    if config.json {
        layers.push(stdout.json().with_filter(env_filter(config)).boxed());
    } else {
        layers.push(stdout.with_filter(env_filter(config)).boxed());
    }

    if let Some(directory) = &config.directory {
        let file_appender = tracing_appender::rolling::hourly(directory, "log.");
        let (non_blocking_file_appender, file_guard) =
            tracing_appender::non_blocking(file_appender);
        guards.push(file_guard);
        let file_appender = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(non_blocking_file_appender)
            .json()
            .with_filter(env_filter(config))
            .boxed();
        layers.push(file_appender);
    }

    if let Some(endpoint) = &config.otlp_endpoint {
        let app_name = env!("CARGO_PKG_NAME");
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint.clone()),
            )
            .with_trace_config(
                trace::config().with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    app_name,
                )])),
            )
            .install_batch(runtime::Tokio)?;
        let opentelemetry = tracing_opentelemetry::layer()
            .with_tracer(tracer)
            .with_filter(env_filter(config))
            .boxed();
        layers.push(opentelemetry);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(LogGuard {
        _guards: guards,
        otlp: config.otlp_endpoint.is_some(),
    })
}
