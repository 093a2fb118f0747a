pub mod clock;
pub mod link;
pub mod metrics_sink;
pub mod rto;
pub mod scheduler;

pub use clock::SimTime;
pub use link::{CacheStore, LinkDelay};
pub use metrics_sink::{
    ConsumerMetricsSink, CsvConsumerMetricsSink, CsvProducerMetricsSink, MetricsSinkError,
    ProducerMetricsSink,
};
pub use rto::RtoManager;
pub use scheduler::Scheduler;
