use crate::utils::{Method, Metrics, Status};
use anyhow::{Context as _, Result};
use opentelemetry::{
    Context, KeyValue, global,
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};
use prometheus_client::registry::Registry;
use tokio::time::Instant;
use tracing::{error, info};

/// OTLP exporters for traces, metrics and logs. Nothing is exported until
/// [`Telemetry::init`] succeeds.
pub struct Telemetry {
    service_name: String,
    otel_endpoint: String,
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

pub struct TracingContext {
    pub cx: Context,
    pub start_time: Instant,
}

impl Telemetry {
    pub fn new(service_name: impl Into<String>, otel_endpoint: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            otel_endpoint: otel_endpoint.into(),
            tracer_provider: None,
            meter_provider: None,
            logger_provider: None,
        }
    }

    fn get_resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .build()
    }

    pub fn init(&mut self) -> Result<()> {
        let span_exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.otel_endpoint.clone())
            .build()
            .context("Failed to create span exporter")?;

        let tracer_provider = SdkTracerProvider::builder()
            .with_resource(self.get_resource())
            .with_batch_exporter(span_exporter)
            .build();
        global::set_tracer_provider(tracer_provider.clone());

        let metric_exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(self.otel_endpoint.clone())
            .build()
            .context("Failed to create metric exporter")?;

        let meter_provider = SdkMeterProvider::builder()
            .with_resource(self.get_resource())
            .with_periodic_exporter(metric_exporter)
            .build();
        global::set_meter_provider(meter_provider.clone());

        let log_exporter = LogExporter::builder()
            .with_tonic()
            .with_endpoint(self.otel_endpoint.clone())
            .build()
            .context("Failed to create log exporter")?;

        let logger_provider = SdkLoggerProvider::builder()
            .with_resource(self.get_resource())
            .with_batch_exporter(log_exporter)
            .build();

        self.tracer_provider = Some(tracer_provider);
        self.meter_provider = Some(meter_provider);
        self.logger_provider = Some(logger_provider);

        Ok(())
    }

    pub fn logger_provider(&self) -> Option<&SdkLoggerProvider> {
        self.logger_provider.as_ref()
    }

    pub fn shutdown(self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(provider) = self.tracer_provider
            && let Err(e) = provider.shutdown()
        {
            errors.push(format!("tracer provider: {e}"));
        }
        if let Some(provider) = self.meter_provider
            && let Err(e) = provider.shutdown()
        {
            errors.push(format!("meter provider: {e}"));
        }
        if let Some(provider) = self.logger_provider
            && let Err(e) = provider.shutdown()
        {
            errors.push(format!("logger provider: {e}"));
        }

        if !errors.is_empty() {
            anyhow::bail!("Failed to shutdown providers:\n{}", errors.join("\n"));
        }

        Ok(())
    }
}

/// Span and request metrics shared by every operation of one service.
#[derive(Clone)]
pub struct ServiceTracer {
    name: &'static str,
    metrics: Metrics,
}

impl ServiceTracer {
    pub fn new(name: &'static str, registry: &mut Registry) -> Self {
        let metrics = Metrics::new();
        metrics.register(&name.replace('-', "_"), registry);

        Self { name, metrics }
    }

    pub fn start_tracing(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = global::tracer(self.name);
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        info!("Starting operation: {operation_name}");

        span.add_event(
            "Operation started",
            vec![KeyValue::new("operation", operation_name.to_string())],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    pub fn complete_tracing_success(&self, tracing_ctx: &TracingContext, method: Method, message: &str) {
        self.complete_tracing_internal(tracing_ctx, method, true, message);
    }

    pub fn complete_tracing_error(&self, tracing_ctx: &TracingContext, method: Method, error_message: &str) {
        self.complete_tracing_internal(tracing_ctx, method, false, error_message);
    }

    fn complete_tracing_internal(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        is_success: bool,
        message: &str,
    ) {
        let status_str = if is_success { "SUCCESS" } else { "ERROR" };
        let status = if is_success {
            Status::Success
        } else {
            Status::Error
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        tracing_ctx.cx.span().add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("✅ Operation completed successfully: {message}");
        } else {
            error!("❌ Operation failed: {message}");
        }

        self.metrics.record(method, status, elapsed);

        tracing_ctx.cx.span().end();
    }
}
