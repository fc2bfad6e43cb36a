use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use tracing_appender::{
    non_blocking,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

const OTEL_FILTER: &str = "info,hyper=off,opentelemetry=off,tonic=off,h2=off,reqwest=off";

/// Console output follows `RUST_LOG` (default `info`). The JSON file layer and
/// the OpenTelemetry bridge are only attached when enabled.
pub fn init_logger(
    sdk_logger_provider: Option<&SdkLoggerProvider>,
    component: &str,
    is_dev: bool,
    enable_file: bool,
) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = if is_dev {
        fmt::layer()
            .pretty()
            .with_thread_names(true)
            .with_ansi(true)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_ansi(false)
            .with_filter(console_filter)
            .boxed()
    };

    let file_layer = if enable_file {
        let log_dir = if is_dev { "./logs" } else { "/var/log/app" };
        let file_name = format!("rust_app_{component}.log");
        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, file_name);
        let (file_writer, guard) = non_blocking(file_appender);

        // the writer must outlive the process
        std::mem::forget(guard);

        Some(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new("info"))
                .boxed(),
        )
    } else {
        None
    };

    let otel_layer = sdk_logger_provider.map(|provider| {
        OpenTelemetryTracingBridge::new(provider)
            .with_filter(EnvFilter::new(OTEL_FILTER))
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(otel_layer)
        .try_init();
}
