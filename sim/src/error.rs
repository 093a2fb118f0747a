use rtc_net_sim::MetricsSinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Producer(#[from] rtc_producer::ProducerError),
    #[error(transparent)]
    Consumer(#[from] rtc_consumer::ConsumerError),
    #[error(transparent)]
    MetricsSink(#[from] MetricsSinkError),
}
