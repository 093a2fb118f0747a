use std::time::Duration;

use rtc_net_sim::{ProducerMetricsSink, SimTime};
use rtc_wire::frame::{
    d_max, discovery_request_name, discovery_response_name, is_bare_delta_request,
    is_bare_key_request, is_discovery_request, producer_base,
};
use rtc_wire::{Name, Request, Response};
use tracing::instrument;

use crate::buffers::{GeneratedBuffer, PendingBuffer};
use crate::config::ProducerConfig;
use crate::error::ProducerError;

const DISCOVERY_FRESHNESS: Duration = Duration::from_millis(90);

/// Outcome of handing a single request to the engine.
#[derive(Debug)]
pub enum RequestOutcome {
    /// A response was produced immediately.
    Responded(Response),
    /// The segment has not been generated yet; the request was appended to the
    /// pending-request buffer.
    Queued,
    /// The name was already in the pending-request buffer; the request was dropped.
    DuplicateDropped,
}

/// Generates segmented key and delta frames on a fixed cadence, serves or queues
/// incoming requests, and tweaks response freshness to steer consumers past stale
/// in-network caches.
pub struct Producer {
    config: ProducerConfig,
    base: Name,
    frame_tick: u64,
    next_key_id: u64,
    next_delta_id: u32,
    generated: GeneratedBuffer,
    pending: PendingBuffer,
}

impl Producer {
    pub fn new(config: ProducerConfig) -> Self {
        let base = producer_base(&config.conference_prefix, &config.producer_prefix);
        let capacity = config.generated_buffer_capacity;
        Self {
            config,
            base,
            frame_tick: 0,
            next_key_id: 0,
            next_delta_id: 0,
            generated: GeneratedBuffer::new(capacity),
            pending: PendingBuffer::new(),
        }
    }

    pub fn sample_period(&self) -> Duration {
        self.config.sample_period()
    }

    pub fn d_max(&self) -> u32 {
        d_max(self.config.sampling_rate)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Runs one generation tick: produces the due frame's segments, writes them to the
    /// metrics sink, then drains any pending requests the new frame satisfies.
    #[instrument(skip(self, sink), level = "debug")]
    pub fn tick(
        &mut self,
        now: SimTime,
        sink: &mut dyn ProducerMetricsSink,
    ) -> Result<Vec<Response>, ProducerError> {
        let (frame_prefix, limit) = if self.frame_tick % u64::from(self.config.sampling_rate) == 0 {
            (
                self.generate_key_frame(now, sink)?,
                self.config.segments_per_key_frame,
            )
        } else {
            (
                self.generate_delta_frame(now, sink)?,
                self.config.segments_per_delta_frame,
            )
        };
        self.frame_tick += 1;

        let drained = self.pending.drain_matching(&frame_prefix, limit as usize);
        Ok(drained
            .into_iter()
            .map(|name| self.build_response(name, self.config.freshness))
            .collect())
    }

    fn generate_key_frame(
        &mut self,
        now: SimTime,
        sink: &mut dyn ProducerMetricsSink,
    ) -> Result<Name, ProducerError> {
        let key_id = self.next_key_id;
        self.next_key_id += 1;
        self.next_delta_id = 0;

        let prefix = self.base.with_text("key").with_seq(key_id);
        for segment_index in 0..self.config.segments_per_key_frame {
            let name = prefix.with_seq(u64::from(segment_index));
            sink.record_generation(now, &name)?;
            self.generated.push(name);
        }
        Ok(prefix)
    }

    fn generate_delta_frame(
        &mut self,
        now: SimTime,
        sink: &mut dyn ProducerMetricsSink,
    ) -> Result<Name, ProducerError> {
        let delta_id = u64::from(self.next_delta_id);
        let key_id = self.next_key_id.saturating_sub(1);
        self.next_delta_id += 1;

        let prefix = self
            .base
            .with_text("delta")
            .with_seq(delta_id)
            .with_text("paired-key")
            .with_seq(key_id);
        for segment_index in 0..self.config.segments_per_delta_frame {
            let name = prefix.with_seq(u64::from(segment_index));
            sink.record_generation(now, &name)?;
            self.generated.push(name);
        }
        Ok(prefix)
    }

    /// Handles a single incoming request, per the producer's request-handling rules.
    #[instrument(skip(self), level = "debug")]
    pub fn handle_request(&mut self, request: &Request) -> RequestOutcome {
        let name = &request.name;

        if is_discovery_request(name) {
            return RequestOutcome::Responded(self.respond_discovery(name));
        }
        if is_bare_delta_request(name) {
            return RequestOutcome::Responded(self.respond_bare_delta());
        }
        if is_bare_key_request(name) {
            return RequestOutcome::Responded(self.respond_bare_key());
        }

        if self.pending.contains(name) {
            return RequestOutcome::DuplicateDropped;
        }
        if self.generated.contains(name) {
            let freshness = self.freshness_for(name);
            return RequestOutcome::Responded(self.build_response(name.clone(), freshness));
        }

        self.pending.push(name.clone());
        RequestOutcome::Queued
    }

    fn respond_discovery(&self, request_name: &Name) -> Response {
        let key_id = self.next_key_id.saturating_sub(1);
        let name = discovery_response_name(request_name, key_id, u64::from(self.next_delta_id));
        self.build_response(name, DISCOVERY_FRESHNESS)
    }

    fn respond_bare_delta(&self) -> Response {
        let name = match self.generated.last_matching("delta") {
            Some(latest) => latest.prefix_minus(1).with_seq(0),
            None => discovery_request_name(&self.base).with_seq(0),
        };
        self.build_response(name, self.config.freshness)
    }

    fn respond_bare_key(&self) -> Response {
        let name = match self.generated.last_matching("key") {
            Some(latest) => latest
                .prefix_minus(1)
                .with_seq(0)
                .with_seq(u64::from(self.next_delta_id)),
            None => discovery_request_name(&self.base).with_seq(0),
        };
        self.build_response(name, self.config.freshness)
    }

    /// The freshness-tweak policy: without tweaking, every matching segment carries the
    /// nominal freshness. With tweaking, key segments always do; delta segments do only
    /// if they belong to the most recently completed delta frame, or — at the wrap
    /// boundary into a new key epoch — only its very last segment.
    fn freshness_for(&self, name: &Name) -> Duration {
        if !self.config.tweak_freshness {
            return self.config.freshness;
        }
        if name.text_at(2).ok() == Some("key") {
            return self.config.freshness;
        }

        let delta_id = name.seq_at(3).unwrap_or(u64::MAX);
        let segment_index = name.seq_at(6).unwrap_or(u64::MAX);

        let is_current = if self.next_delta_id == 0 {
            delta_id == u64::from(self.d_max())
                && segment_index == u64::from(self.config.segments_per_delta_frame - 1)
        } else {
            delta_id + 1 == u64::from(self.next_delta_id)
        };

        if is_current {
            self.config.freshness
        } else {
            Duration::ZERO
        }
    }

    fn build_response(&self, name: Name, freshness: Duration) -> Response {
        Response::new(name, vec![0u8; self.config.payload_size], freshness)
            .with_signature(self.config.signature_kind, self.config.key_locator.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtc_net_sim::MetricsSinkError;

    struct NullSink;
    impl ProducerMetricsSink for NullSink {
        fn record_generation(&mut self, _time: SimTime, _frame_name: &Name) -> Result<(), MetricsSinkError> {
            Ok(())
        }
    }

    fn config() -> ProducerConfig {
        ProducerConfig {
            conference_prefix: Name::parse("/conf"),
            producer_prefix: Name::parse("/producer"),
            sampling_rate: 30,
            segments_per_delta_frame: 5,
            segments_per_key_frame: 30,
            freshness: Duration::from_millis(10),
            ..ProducerConfig::default()
        }
    }

    #[test]
    fn first_tick_always_generates_a_key_frame() {
        let mut producer = Producer::new(config());
        let mut sink = NullSink;
        producer.tick(Duration::ZERO, &mut sink).unwrap();
        assert!(producer
            .generated
            .contains(&Name::parse("/conf/producer/key/0/0")));
    }

    #[test]
    fn request_for_ungenerated_segment_is_queued_then_drained() {
        let mut producer = Producer::new(config());
        let mut sink = NullSink;

        let request = Request::new(
            Name::parse("/conf/producer/delta/0/paired-key/0/2"),
            1,
            Duration::from_millis(300),
            false,
        );
        match producer.handle_request(&request) {
            RequestOutcome::Queued => {}
            other => panic!("expected Queued, got {other:?}"),
        }
        assert_eq!(producer.pending_len(), 1);

        producer.tick(Duration::ZERO, &mut sink).unwrap(); // generates key frame 0
        let responses = producer
            .tick(producer.sample_period(), &mut sink)
            .unwrap(); // generates delta frame 0, drains the pending request

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].name, request.name);
        assert_eq!(producer.pending_len(), 0);
    }

    #[test]
    fn duplicate_pending_request_is_dropped() {
        let mut producer = Producer::new(config());
        let request = Request::new(
            Name::parse("/conf/producer/key/5/5"),
            1,
            Duration::from_millis(300),
            false,
        );
        producer.handle_request(&request);
        match producer.handle_request(&request) {
            RequestOutcome::DuplicateDropped => {}
            other => panic!("expected DuplicateDropped, got {other:?}"),
        }
        assert_eq!(producer.pending_len(), 1);
    }

    #[test]
    fn discovery_request_forces_ninety_millisecond_freshness() {
        let mut producer = Producer::new(config());
        let mut sink = NullSink;
        producer.tick(Duration::ZERO, &mut sink).unwrap();

        let request = Request::new(
            discovery_request_name(&producer.base),
            1,
            Duration::from_millis(300),
            true,
        );
        match producer.handle_request(&request) {
            RequestOutcome::Responded(response) => {
                assert_eq!(response.freshness_period, DISCOVERY_FRESHNESS);
                assert_eq!(response.name, Name::parse("/conf/producer/discovery/0/0"));
            }
            other => panic!("expected Responded, got {other:?}"),
        }
    }

    #[test]
    fn freshness_tweak_wrap_boundary_only_fresh_on_last_segment() {
        let mut producer = Producer::new(ProducerConfig {
            tweak_freshness: true,
            ..config()
        });
        producer.next_key_id = 1;
        producer.next_delta_id = 0; // just wrapped: the epoch's final delta was id 28
        producer
            .generated
            .push(Name::parse("/conf/producer/delta/28/paired-key/0/4"));
        producer
            .generated
            .push(Name::parse("/conf/producer/delta/28/paired-key/0/2"));

        let last_segment = Name::parse("/conf/producer/delta/28/paired-key/0/4");
        let mid_segment = Name::parse("/conf/producer/delta/28/paired-key/0/2");
        assert_eq!(producer.freshness_for(&last_segment), Duration::from_millis(10));
        assert_eq!(producer.freshness_for(&mid_segment), Duration::ZERO);
    }
}
