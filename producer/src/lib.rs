pub mod buffers;
pub mod config;
pub mod engine;
pub mod error;

pub use config::ProducerConfig;
pub use engine::{Producer, RequestOutcome};
pub use error::ProducerError;
