use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use super::otel_tracer::OtelTracer;

#[derive(Debug, Error)]
pub enum TracerEngineError {
    #[error("Failed to set OpenTelemetry global error handler: {0}")]
    SetErrorHandler(#[from] opentelemetry::global::Error),
}

/// Options controlling whether/where OpenTelemetry traces are exported.
#[derive(Clone, Debug)]
pub struct TracerOptions {
    otel_endpoint: Option<String>,
    otel_namespace: String,
}

impl TracerOptions {
    pub fn new(otel_endpoint: Option<&str>, otel_namespace: String) -> Self {
        Self {
            otel_endpoint: otel_endpoint.map(str::to_owned),
            otel_namespace,
        }
    }
}

/// Owns the process-wide `tracing` subscriber, and the optional OpenTelemetry tracer
/// provider it was built from. Kept alive for the binary's lifetime; dropping it
/// flushes any buffered OTLP spans.
pub struct TracerEngine {
    otel: Option<OtelTracer>,
    setup_error: Option<String>,
}

impl TracerEngine {
    pub fn new(options: TracerOptions, service_name: &'static str) -> Self {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match options.otel_endpoint.as_deref() {
            Some(endpoint) => {
                match OtelTracer::new(endpoint, service_name, &options.otel_namespace) {
                    Ok(otel) => {
                        let registry = tracing_subscriber::registry()
                            .with(env_filter)
                            .with(tracing_subscriber::fmt::layer())
                            .with(tracing_opentelemetry::layer().with_tracer(otel.tracer()));
                        // Only one subscriber may be installed per process; a failure here
                        // means a previous engine was already initialised.
                        let _ = registry.try_init();
                        Self {
                            otel: Some(otel),
                            setup_error: None,
                        }
                    }
                    Err(e) => {
                        let registry = tracing_subscriber::registry()
                            .with(env_filter)
                            .with(tracing_subscriber::fmt::layer());
                        let _ = registry.try_init();
                        Self {
                            otel: None,
                            setup_error: Some(e.to_string()),
                        }
                    }
                }
            }
            None => {
                let registry = tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer());
                let _ = registry.try_init();
                Self {
                    otel: None,
                    setup_error: None,
                }
            }
        }
    }

    pub fn use_otel(&self) -> bool {
        self.otel.is_some()
    }

    pub fn get_otel_setup_error(&self) -> Option<&str> {
        self.setup_error.as_deref()
    }

    pub fn set_otel_error_handler(
        &self,
        handler: impl Fn(opentelemetry::global::Error) + Send + Sync + 'static,
    ) -> Result<(), TracerEngineError> {
        opentelemetry::global::set_error_handler(handler).map_err(TracerEngineError::from)
    }
}

impl Drop for TracerEngine {
    fn drop(&mut self) {
        if self.otel.is_some() {
            opentelemetry::global::shutdown_tracer_provider();
        }
    }
}
