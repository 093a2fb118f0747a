use rtc_net_sim::MetricsSinkError;
use rtc_wire::NameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    MetricsSink(#[from] MetricsSinkError),
    #[error("response received before bootstrap completed carried no discovery-shaped name: {0}")]
    MalformedBootstrapResponse(rtc_wire::Name),
}
