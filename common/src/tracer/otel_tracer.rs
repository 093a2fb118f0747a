use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::Tracer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtelTracerError {
    #[error("Failed to build OTLP exporter for endpoint {endpoint}: {source}")]
    BuildExporter {
        endpoint: String,
        #[source]
        source: opentelemetry_otlp::Error,
    },
}

/// Thin wrapper around an OpenTelemetry OTLP tracer provider, scoped to a single
/// service name and namespace.
pub struct OtelTracer {
    tracer: Tracer,
}

impl OtelTracer {
    pub fn new(
        endpoint: &str,
        service_name: &'static str,
        service_namespace: &str,
    ) -> Result<Self, OtelTracerError> {
        let exporter = opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint);

        let provider = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(exporter)
            .with_trace_config(opentelemetry_sdk::trace::config().with_resource(Resource::new([
                KeyValue::new("service.name", service_name),
                KeyValue::new("service.namespace", service_namespace.to_owned()),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .map_err(|source| OtelTracerError::BuildExporter {
                endpoint: endpoint.to_owned(),
                source,
            })?;

        let tracer = provider.tracer(service_name);
        global::set_tracer_provider(provider);

        Ok(Self { tracer })
    }

    pub fn tracer(&self) -> Tracer {
        self.tracer.clone()
    }
}
