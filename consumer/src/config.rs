use std::time::Duration;

use rtc_wire::Name;

/// Parameters the consumer engine is constructed with. `conference_prefix` is the
/// delta-namespace prefix (e.g. `/conf/producer/delta`); its last component is
/// stripped to form the discovery request name.
#[derive(Clone, Debug)]
pub struct ConsumerConfig {
    pub conference_prefix: Name,
    pub must_be_fresh_num: u32,
    pub sampling_rate: u32,
    pub freshness: Duration,
    pub segments_per_delta_frame: u32,
    pub segments_per_key_frame: u32,
    pub print_lambda: bool,
    pub number: u32,
    pub rtt_ideal_ms: u32,
    pub max_seq: u32,
    pub interest_lifetime: Duration,
}

impl ConsumerConfig {
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.sampling_rate))
    }

    pub fn discovery_prefix(&self) -> Name {
        self.conference_prefix.prefix_minus(1).with_text("discovery")
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            conference_prefix: Name::new(),
            must_be_fresh_num: 1,
            sampling_rate: 30,
            freshness: Duration::from_millis(0),
            segments_per_delta_frame: 5,
            segments_per_key_frame: 30,
            print_lambda: false,
            number: 0,
            rtt_ideal_ms: 0,
            max_seq: u32::MAX,
            interest_lifetime: Duration::from_millis(1000),
        }
    }
}
