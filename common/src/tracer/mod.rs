mod otel_tracer;
mod tracer_engine;

pub use otel_tracer::OtelTracer;
pub use tracer_engine::{TracerEngine, TracerOptions};

/// Should be called at the start of each binary's `main`.
#[macro_export]
macro_rules! init_tracer {
    ($options:expr) => {{
        let tracer = $crate::tracer::TracerEngine::new($options, env!("CARGO_BIN_NAME"));
        // Called here (in the macro) rather than as part of `TracerEngine::new`
        // so the warning is emitted in the correct module.
        if tracer.use_otel() {
            if let Some(e) = tracer.get_otel_setup_error() {
                tracing::warn!("{e}");
            } else if let Err(e) = tracer.set_otel_error_handler(|e| tracing::warn!("{e}")) {
                tracing::warn!("{e}");
            }
        }
        tracer
    }};
}
