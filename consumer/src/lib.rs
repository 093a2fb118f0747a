pub mod arrival;
pub mod config;
pub mod engine;
pub mod error;
pub mod tables;

pub use arrival::ArrivalKind;
pub use config::ConsumerConfig;
pub use engine::{Consumer, ConsumerAction, ResponseEffect};
pub use error::ConsumerError;
