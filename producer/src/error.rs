use rtc_net_sim::MetricsSinkError;
use rtc_wire::NameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    MetricsSink(#[from] MetricsSinkError),
}
