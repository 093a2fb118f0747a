//! Names of the counters/gauges this workspace emits through the `metrics` facade,
//! mirrored on `digitiser-aggregator`'s `metrics::names` usage.
use metrics::counter;

pub const REQUESTS_SENT: &str = "rtc_requests_sent";
pub const REQUESTS_RECEIVED: &str = "rtc_requests_received";
pub const RESPONSES_SENT: &str = "rtc_responses_sent";
pub const RESPONSES_RECEIVED: &str = "rtc_responses_received";
pub const TIMEOUTS: &str = "rtc_timeouts";
pub const PENDING_DEDUPED: &str = "rtc_pending_deduped";
pub const LAMBDA: &str = "rtc_lambda";

/// Registers the standard `component_info` gauge, the way every pipeline binary does
/// at startup so Prometheus queries can be scoped per binary name.
pub fn component_info_metric(component_name: &'static str) {
    counter!("rtc_component_info", &[("component", component_name)]).increment(1);
}

pub fn describe_all() {
    metrics::describe_counter!(REQUESTS_SENT, metrics::Unit::Count, "Requests sent");
    metrics::describe_counter!(REQUESTS_RECEIVED, metrics::Unit::Count, "Requests received");
    metrics::describe_counter!(RESPONSES_SENT, metrics::Unit::Count, "Responses sent");
    metrics::describe_counter!(
        RESPONSES_RECEIVED,
        metrics::Unit::Count,
        "Responses received"
    );
    metrics::describe_counter!(TIMEOUTS, metrics::Unit::Count, "Request timeouts");
    metrics::describe_counter!(
        PENDING_DEDUPED,
        metrics::Unit::Count,
        "Duplicate pending requests dropped"
    );
    metrics::describe_gauge!(LAMBDA, metrics::Unit::Count, "Current consumer window size");
}
