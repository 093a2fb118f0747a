use std::time::Duration;

use rtc_wire::Name;

/// Parameters the producer engine is constructed with. Mirrors the configuration
/// surface exposed on the command line.
#[derive(Clone, Debug)]
pub struct ProducerConfig {
    pub conference_prefix: Name,
    pub producer_prefix: Name,
    pub sampling_rate: u32,
    pub segments_per_delta_frame: u32,
    pub segments_per_key_frame: u32,
    pub payload_size: usize,
    pub freshness: Duration,
    pub signature_kind: u32,
    pub key_locator: Option<Name>,
    pub tweak_freshness: bool,
    pub generated_buffer_capacity: usize,
}

impl ProducerConfig {
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.sampling_rate))
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            conference_prefix: Name::new(),
            producer_prefix: Name::new(),
            sampling_rate: 30,
            segments_per_delta_frame: 5,
            segments_per_key_frame: 30,
            payload_size: 1024,
            freshness: Duration::from_millis(0),
            signature_kind: 0,
            key_locator: None,
            tweak_freshness: false,
            generated_buffer_capacity: 100,
        }
    }
}
