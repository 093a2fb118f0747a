use std::time::Duration;

use rtc_net_sim::{ConsumerMetricsSink, SimTime};
use rtc_wire::frame::{d_max, delta_segment_identity, discovery_response_identity};
use rtc_wire::{Name, Request, Response};
use tracing::instrument;

use crate::arrival::ArrivalKind;
use crate::config::ConsumerConfig;
use crate::error::ConsumerError;
use crate::tables::{AllOutstanding, FrameSegmentCounters, OutstandingTable};

/// What the driver should do after handing a response or timeout to the engine.
#[derive(Debug)]
pub enum ConsumerAction {
    /// Bootstrap is still in progress; wait this long, then call
    /// [`Consumer::send_discovery`] again.
    RetryDiscoveryAfter(Duration),
    /// Send these requests now.
    Requests(Vec<Request>),
}

/// The local sequence number cancelled by a response, if any was matched, alongside
/// the action it produced.
#[derive(Debug)]
pub struct ResponseEffect {
    pub cancelled_seq: Option<u64>,
    pub action: ConsumerAction,
}

/// Bootstraps against an unknown producer, retrieves the current key frame and
/// historical deltas of its epoch, then maintains an adaptively paced pipeline of new
/// delta-frame requests sized to the measured round-trip delay.
pub struct Consumer {
    config: ConsumerConfig,
    discovery_prefix: Name,
    base: Option<Name>,
    exact_data_name: Option<Name>,

    drd: Duration,
    lambda: u32,
    initial_lambda: u32,
    in_flight_deltas: u32,
    in_flight_keys: u32,
    in_flight_frames: u32,
    current_delta_num: u64,
    current_key_num: u64,
    current_key_num_for_deltas: u64,
    segments_received: u64,
    bootstrap_done: bool,
    must_be_fresh_remaining: u32,
    initial_key_frame_id: u64,
    initial_key_segment_received: bool,

    t0: Option<SimTime>,
    first_interest_sent: Option<SimTime>,
    previous_data_arrival: Option<SimTime>,
    bootstrap_interests: u32,

    next_nonce: u32,
    next_seq: u64,

    outstanding_keys: OutstandingTable,
    outstanding_deltas: OutstandingTable,
    outstanding_previous_deltas: OutstandingTable,
    all_outstanding: AllOutstanding,
    frame_segment_counters: FrameSegmentCounters,
}

impl Consumer {
    pub fn new(config: ConsumerConfig) -> Self {
        let discovery_prefix = config.discovery_prefix();
        let must_be_fresh_remaining = config.must_be_fresh_num;
        Self {
            config,
            discovery_prefix,
            base: None,
            exact_data_name: None,
            drd: Duration::ZERO,
            lambda: 0,
            initial_lambda: 0,
            in_flight_deltas: 0,
            in_flight_keys: 0,
            in_flight_frames: 0,
            current_delta_num: 0,
            current_key_num: 0,
            current_key_num_for_deltas: 0,
            segments_received: 0,
            bootstrap_done: false,
            must_be_fresh_remaining,
            initial_key_frame_id: 0,
            initial_key_segment_received: false,
            t0: None,
            first_interest_sent: None,
            previous_data_arrival: None,
            bootstrap_interests: 0,
            next_nonce: 0,
            next_seq: 0,
            outstanding_keys: OutstandingTable::new(),
            outstanding_deltas: OutstandingTable::new(),
            outstanding_previous_deltas: OutstandingTable::new(),
            all_outstanding: AllOutstanding::new(),
            frame_segment_counters: FrameSegmentCounters::new(),
        }
    }

    pub fn lambda(&self) -> u32 {
        self.lambda
    }

    pub fn drd(&self) -> Duration {
        self.drd
    }

    pub fn in_flight_frames(&self) -> u32 {
        self.in_flight_frames
    }

    pub fn bootstrap_done(&self) -> bool {
        self.bootstrap_done
    }

    /// Looks up the local sequence number a previously emitted request was tracked
    /// under, so a driver can key its own timeout/cancellation bookkeeping off it.
    pub fn seq_for(&self, name: &Name) -> Option<u64> {
        self.all_outstanding.seq_for_name(name)
    }

    fn sample_period(&self) -> Duration {
        self.config.sample_period()
    }

    fn d_max(&self) -> u64 {
        u64::from(d_max(self.config.sampling_rate))
    }

    fn next_nonce(&mut self) -> u32 {
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        nonce
    }

    fn track(&mut self, name: Name) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.all_outstanding.push(seq, name);
        seq
    }

    fn new_request(&mut self, name: Name, must_be_fresh: bool) -> Request {
        let nonce = self.next_nonce();
        Request::new(name, nonce, self.config.interest_lifetime, must_be_fresh)
    }

    /// Sends (or resends) the discovery request that starts, or continues, bootstrap.
    /// Called once at application start, and again after each `mustBeFresh` retry wait.
    #[instrument(skip(self), level = "debug")]
    pub fn send_discovery(&mut self, now: SimTime) -> Request {
        let must_be_fresh = self.must_be_fresh_remaining > 0;
        if must_be_fresh {
            self.must_be_fresh_remaining -= 1;
        }
        let request = self.new_request(self.discovery_prefix.clone(), must_be_fresh);
        self.track(request.name.clone());
        self.t0 = Some(now);
        self.first_interest_sent.get_or_insert(now);
        request
    }

    fn cancel_outstanding(&mut self, name: &Name) -> Option<u64> {
        let seq = self
            .all_outstanding
            .seq_for_name(name)
            .or_else(|| {
                if name.text_at(2).ok() == Some("discovery") {
                    self.all_outstanding.seq_for_discovery()
                } else {
                    None
                }
            })?;
        self.all_outstanding.remove(seq);
        Some(seq)
    }

    /// Dispatches a single response per the engine's response-handling rules.
    #[instrument(skip(self, response, sink), level = "debug")]
    pub fn handle_response(
        &mut self,
        response: &Response,
        now: SimTime,
        sink: &mut dyn ConsumerMetricsSink,
    ) -> Result<ResponseEffect, ConsumerError> {
        let cancelled_seq = self.cancel_outstanding(&response.name);

        let action = if !self.bootstrap_done {
            self.handle_bootstrap_response(response, now, sink)?
        } else if response.name.text_at(2).ok() == Some("key") {
            ConsumerAction::Requests(self.handle_key_segment(response, now, sink)?)
        } else if let Some(requests) = self.handle_previous_delta_segment(response, now, sink)? {
            ConsumerAction::Requests(requests)
        } else {
            self.segments_received += 1;
            let mut requests = self.handle_delta_segment(response, now, sink)?;
            requests.extend(self.schedule_next_delta_frame(now));
            ConsumerAction::Requests(requests)
        };

        Ok(ResponseEffect { cancelled_seq, action })
    }

    fn handle_bootstrap_response(
        &mut self,
        response: &Response,
        now: SimTime,
        sink: &mut dyn ConsumerMetricsSink,
    ) -> Result<ConsumerAction, ConsumerError> {
        let t0 = self.t0.unwrap_or(now);
        let lambda_before = self.lambda;

        let inter_arrival = if lambda_before != 0 {
            let delay = now.saturating_sub(self.previous_data_arrival.unwrap_or(now));
            self.previous_data_arrival = Some(now);
            delay
        } else {
            self.previous_data_arrival = Some(now);
            Duration::ZERO
        };

        let elapsed = now.saturating_sub(t0);
        self.drd = elapsed;
        self.lambda = (self.drd.as_secs_f64() / self.sample_period().as_secs_f64()).ceil() as u32;
        self.initial_lambda = self.lambda;

        sink.record_retrieval(now, elapsed, &response.name)?;
        sink.record_inter_arrival(now, inter_arrival, &response.name)?;

        let (discovered_key_id, discovered_delta_id) = discovery_response_identity(&response.name)
            .map_err(|_| ConsumerError::MalformedBootstrapResponse(response.name.clone()))?;

        if self.current_delta_num <= discovered_delta_id && self.current_key_num <= discovered_key_id {
            self.current_delta_num = 0;
            self.current_key_num = discovered_key_id + 1;
            self.current_key_num_for_deltas = discovered_key_id + 1;
            self.initial_key_frame_id = self.current_key_num;
        }

        self.base = Some(response.name.prefix(response.name.len().saturating_sub(3)));
        self.exact_data_name = self.base.as_ref().map(|base| base.with_text("delta"));

        if self.must_be_fresh_remaining > 0 {
            return Ok(ConsumerAction::RetryDiscoveryAfter(
                self.config.freshness + Duration::from_millis(1),
            ));
        }

        self.bootstrap_done = true;
        self.segments_received = 1;

        let mut requests = self.fetch_current_key_frame(now);
        if discovered_delta_id > 0 {
            requests.extend(self.fetch_previously_generated_deltas(now, discovered_delta_id, discovered_key_id));
        }
        requests.extend(self.schedule_next_delta_frame(now));
        Ok(ConsumerAction::Requests(requests))
    }

    fn fetch_current_key_frame(&mut self, now: SimTime) -> Vec<Request> {
        let Some(base) = self.base.clone() else {
            return Vec::new();
        };
        let key_id = self.current_key_num;
        self.current_key_num += 1;

        let prefix = base.with_text("key").with_seq(key_id);
        let mut requests = Vec::with_capacity(self.config.segments_per_key_frame as usize);
        for segment_index in 0..self.config.segments_per_key_frame {
            let name = prefix.with_seq(u64::from(segment_index));
            requests.push(self.new_request(name.clone(), false));
            self.track(name.clone());
            self.outstanding_keys.push(name, now);
            self.in_flight_keys += 1;
        }
        requests
    }

    fn fetch_previously_generated_deltas(
        &mut self,
        now: SimTime,
        up_to_delta_id: u64,
        key_id: u64,
    ) -> Vec<Request> {
        let Some(base) = self.base.clone() else {
            return Vec::new();
        };
        let mut requests = Vec::new();
        for delta_id in 0..=up_to_delta_id {
            let prefix = base
                .with_text("delta")
                .with_seq(delta_id)
                .with_text("paired-key")
                .with_seq(key_id);
            for segment_index in 0..self.config.segments_per_delta_frame {
                let name = prefix.with_seq(u64::from(segment_index));
                requests.push(self.new_request(name.clone(), false));
                self.track(name.clone());
                self.outstanding_previous_deltas.push(name, now);
                self.in_flight_deltas += 1;
            }
        }
        requests
    }

    /// The central pacing algorithm: tops the in-flight frame count up to `λ`.
    #[instrument(skip(self), level = "debug")]
    pub fn schedule_next_delta_frame(&mut self, now: SimTime) -> Vec<Request> {
        let Some(exact_data_name) = self.exact_data_name.clone() else {
            return Vec::new();
        };
        if self.lambda <= self.in_flight_frames {
            return Vec::new();
        }
        let slots = self.lambda - self.in_flight_frames;
        let mut requests = Vec::new();

        for _ in 0..slots {
            if self.current_delta_num == self.d_max() {
                self.current_delta_num = 0;
                self.current_key_num_for_deltas += 1;
            } else {
                self.current_delta_num += 1;
            }
            let delta_id = self.current_delta_num;
            let key_id = self.current_key_num_for_deltas;

            self.frame_segment_counters
                .start_frame(key_id, delta_id, self.config.segments_per_delta_frame);

            let prefix = exact_data_name
                .with_seq(delta_id)
                .with_text("paired-key")
                .with_seq(key_id);
            for segment_index in 0..self.config.segments_per_delta_frame {
                let name = prefix.with_seq(u64::from(segment_index));
                requests.push(self.new_request(name.clone(), false));
                self.track(name.clone());
                self.outstanding_deltas.push(name, now);
                self.in_flight_deltas += 1;
            }
        }
        self.in_flight_frames += slots;
        requests
    }

    fn handle_key_segment(
        &mut self,
        response: &Response,
        now: SimTime,
        sink: &mut dyn ConsumerMetricsSink,
    ) -> Result<Vec<Request>, ConsumerError> {
        if let Some(sent_at) = self.outstanding_keys.take(&response.name) {
            let rtt = now.saturating_sub(sent_at);
            sink.record_retrieval(now, rtt, &response.name)?;
        }

        let key_id = response.name.seq_at(3).unwrap_or(u64::MAX);
        let mut requests = Vec::new();
        if key_id == self.initial_key_frame_id && !self.initial_key_segment_received {
            self.initial_key_segment_received = true;
            requests.extend(self.schedule_next_delta_frame(now));
        }
        if self.outstanding_keys.is_empty() {
            requests.extend(self.fetch_current_key_frame(now));
        }
        Ok(requests)
    }

    fn handle_previous_delta_segment(
        &mut self,
        response: &Response,
        now: SimTime,
        sink: &mut dyn ConsumerMetricsSink,
    ) -> Result<Option<Vec<Request>>, ConsumerError> {
        let Some(sent_at) = self.outstanding_previous_deltas.take(&response.name) else {
            return Ok(None);
        };
        let rtt = now.saturating_sub(sent_at);
        sink.record_retrieval(now, rtt, &response.name)?;
        Ok(Some(Vec::new()))
    }

    fn handle_delta_segment(
        &mut self,
        response: &Response,
        now: SimTime,
        sink: &mut dyn ConsumerMetricsSink,
    ) -> Result<Vec<Request>, ConsumerError> {
        self.bootstrap_interests += 1;

        let Some(sent_at) = self.outstanding_deltas.take(&response.name) else {
            return Ok(Vec::new());
        };
        let rtt = now.saturating_sub(sent_at);

        let n = self.segments_received as f64;
        let drd_secs = self.drd.as_secs_f64() + (rtt.as_secs_f64() - self.drd.as_secs_f64()) / n;
        self.drd = Duration::from_secs_f64(drd_secs.max(0.0));

        if let Ok((delta_id, key_id, _)) = delta_segment_identity(&response.name) {
            if self.frame_segment_counters.segment_received(key_id, delta_id) {
                self.in_flight_frames = self.in_flight_frames.saturating_sub(1);
            }
        }

        sink.record_retrieval(now, rtt, &response.name)?;

        let last_component = response.name.seq_at(response.name.len().saturating_sub(1)).unwrap_or(u64::MAX);
        if last_component == 0 {
            let inter_arrival = now.saturating_sub(self.previous_data_arrival.unwrap_or(now));
            self.previous_data_arrival = Some(now);
            let kind = ArrivalKind::classify(inter_arrival, self.sample_period());
            tracing::debug!(?kind, "frame inter-arrival classified");
            sink.record_inter_arrival(now, inter_arrival, &response.name)?;
        }

        self.lambda = (self.drd.as_secs_f64() / self.sample_period().as_secs_f64()).ceil() as u32;
        if self.config.print_lambda {
            tracing::info!(lambda = self.lambda, "window updated");
        }

        Ok(Vec::new())
    }

    /// Handles an RTO-reported timeout for local sequence `seq`: doubles the timer is
    /// the RTO manager's job; the engine only resends the identical name with a fresh
    /// nonce. In-flight tables are left untouched.
    #[instrument(skip(self), level = "debug")]
    pub fn handle_timeout(&mut self, seq: u64) -> Option<Request> {
        let name = self.all_outstanding.name_for_seq(seq)?.clone();
        Some(self.new_request(name, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtc_net_sim::MetricsSinkError;
    use rtc_wire::frame::{discovery_response_name, producer_base};

    struct NullSink;
    impl ConsumerMetricsSink for NullSink {
        fn record_retrieval(&mut self, _time: SimTime, _rtt: Duration, _frame_name: &Name) -> Result<(), MetricsSinkError> {
            Ok(())
        }
        fn record_inter_arrival(
            &mut self,
            _time: SimTime,
            _inter_arrival: Duration,
            _frame_name: &Name,
        ) -> Result<(), MetricsSinkError> {
            Ok(())
        }
    }

    fn config() -> ConsumerConfig {
        ConsumerConfig {
            conference_prefix: Name::parse("/conf/producer/delta"),
            must_be_fresh_num: 0,
            sampling_rate: 30,
            segments_per_delta_frame: 5,
            segments_per_key_frame: 30,
            ..ConsumerConfig::default()
        }
    }

    #[test]
    fn bootstrap_single_shot_computes_drd_and_lambda() {
        let mut consumer = Consumer::new(config());
        let mut sink = NullSink;

        let discovery = consumer.send_discovery(Duration::from_millis(1000));
        let base = producer_base(&Name::parse("/conf"), &Name::parse("/producer"));
        // discovered_delta_id = 0: joined right at epoch start, so no historical
        // catch-up is triggered and this is a true single-shot bootstrap.
        let response_name = discovery_response_name(&discovery.name, 0, 0);
        let response = Response::new(response_name, vec![], Duration::from_millis(90));

        let effect = consumer
            .handle_response(&response, Duration::from_millis(1020), &mut sink)
            .unwrap();

        assert_eq!(consumer.drd(), Duration::from_millis(20));
        assert_eq!(consumer.lambda(), 1);
        assert!(consumer.bootstrap_done());
        match effect.action {
            ConsumerAction::Requests(requests) => {
                assert_eq!(requests.len(), 30 + 5); // one key-frame burst, one new delta frame
            }
            other => panic!("expected Requests, got {other:?}"),
        }
        let _ = base;
    }

    #[test]
    fn historical_catch_up_issues_previous_delta_requests_when_joining_mid_epoch() {
        let mut consumer = Consumer::new(config());
        let mut sink = NullSink;
        let discovery = consumer.send_discovery(Duration::from_millis(1400));
        let response_name = discovery_response_name(&discovery.name, 0, 10);
        let response = Response::new(response_name, vec![], Duration::from_millis(90));

        let effect = consumer
            .handle_response(&response, Duration::from_millis(1420), &mut sink)
            .unwrap();

        match effect.action {
            ConsumerAction::Requests(requests) => {
                // 30 key-frame segments + (10+1)*5 historical-delta segments + 5 new delta segments
                assert_eq!(requests.len(), 30 + 55 + 5);
            }
            other => panic!("expected Requests, got {other:?}"),
        }
    }

    #[test]
    fn retry_discovery_waits_freshness_plus_one_millisecond() {
        let mut consumer = Consumer::new(ConsumerConfig {
            must_be_fresh_num: 1,
            freshness: Duration::from_millis(10),
            ..config()
        });
        let mut sink = NullSink;
        let discovery = consumer.send_discovery(Duration::from_millis(1000));
        let response_name = discovery_response_name(&discovery.name, 0, 5);
        let response = Response::new(response_name, vec![], Duration::from_millis(90));

        let effect = consumer
            .handle_response(&response, Duration::from_millis(1020), &mut sink)
            .unwrap();

        match effect.action {
            ConsumerAction::RetryDiscoveryAfter(delay) => {
                assert_eq!(delay, Duration::from_millis(11));
            }
            other => panic!("expected RetryDiscoveryAfter, got {other:?}"),
        }
        assert!(!consumer.bootstrap_done());
    }
}
