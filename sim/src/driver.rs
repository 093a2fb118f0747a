use std::collections::HashMap;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rtc_consumer::{Consumer, ConsumerAction, ConsumerConfig};
use rtc_net_sim::{CacheStore, ConsumerMetricsSink, LinkDelay, ProducerMetricsSink, RtoManager, Scheduler, SimTime};
use rtc_producer::{Producer, ProducerConfig, RequestOutcome};
use rtc_wire::{Name, Request, Response};
use tracing::instrument;

use crate::error::DriverError;

enum Event {
    ProducerTick,
    RequestArrival { consumer: usize, request: Request },
    ResponseArrival { consumer: usize, response: Response },
    Timeout { consumer: usize, seq: u64 },
    RetryDiscovery { consumer: usize },
}

/// Drives one producer and a fleet of consumers through a shared, delay- and
/// cache-modelling network, stepping the discrete-event scheduler until a deadline.
pub struct Driver {
    scheduler: Scheduler<Event>,
    sample_period: Duration,
    producer: Producer,
    producer_sink: Box<dyn ProducerMetricsSink>,
    consumers: Vec<Consumer>,
    consumer_sinks: Vec<Box<dyn ConsumerMetricsSink>>,
    link: LinkDelay,
    cache: CacheStore,
    rto: RtoManager,
    outstanding_timeouts: HashMap<(usize, u64), Duration>,
    pit: HashMap<Name, Vec<usize>>,
    rng: StdRng,
}

impl Driver {
    pub fn new(
        producer_config: ProducerConfig,
        consumer_configs: Vec<ConsumerConfig>,
        link: LinkDelay,
        rto: RtoManager,
        producer_sink: Box<dyn ProducerMetricsSink>,
        consumer_sinks: Vec<Box<dyn ConsumerMetricsSink>>,
        rng_seed: u64,
    ) -> Self {
        let sample_period = producer_config.sample_period();
        let producer = Producer::new(producer_config);
        let consumers = consumer_configs.into_iter().map(Consumer::new).collect();
        Self {
            scheduler: Scheduler::new(),
            sample_period,
            producer,
            producer_sink,
            consumers,
            consumer_sinks,
            link,
            cache: CacheStore::new(),
            rto,
            outstanding_timeouts: HashMap::new(),
            pit: HashMap::new(),
            rng: StdRng::seed_from_u64(rng_seed),
        }
    }

    /// Starts the producer's generation cadence and bootstraps every consumer, then
    /// drains the event queue until no event remains at or before `end`.
    #[instrument(skip(self))]
    pub fn run_until(&mut self, end: SimTime) -> Result<(), DriverError> {
        self.scheduler.schedule_at(Duration::ZERO, Event::ProducerTick);
        for consumer in 0..self.consumers.len() {
            let request = self.consumers[consumer].send_discovery(Duration::ZERO);
            self.send_and_track(Duration::ZERO, consumer, request);
        }

        while let Some((time, event)) = self.scheduler.pop() {
            if time > end {
                break;
            }
            self.handle_event(time, event)?;
        }
        Ok(())
    }

    fn send_and_track(&mut self, now: SimTime, consumer: usize, request: Request) {
        if let Some(seq) = self.consumers[consumer].seq_for(&request.name) {
            let timeout = self.rto.initial_timeout();
            self.outstanding_timeouts.insert((consumer, seq), timeout);
            self.scheduler.schedule_after(timeout, Event::Timeout { consumer, seq });
        }
        self.route_request(now, consumer, request);
    }

    fn route_request(&mut self, _now: SimTime, consumer: usize, request: Request) {
        let delay = self.link.sample(&mut self.rng);
        self.scheduler.schedule_after(delay, Event::RequestArrival { consumer, request });
    }

    fn schedule_response_delivery(&mut self, consumer: usize, response: Response) {
        let delay = self.link.sample(&mut self.rng);
        self.scheduler
            .schedule_after(delay, Event::ResponseArrival { consumer, response });
    }

    #[instrument(skip(self, event), level = "debug")]
    fn handle_event(&mut self, now: SimTime, event: Event) -> Result<(), DriverError> {
        match event {
            Event::ProducerTick => {
                let responses = self.producer.tick(now, &mut *self.producer_sink)?;
                for response in responses {
                    self.cache.put(response.clone(), now);
                    if let Some(waiters) = self.pit.remove(&response.name) {
                        for consumer in waiters {
                            self.schedule_response_delivery(consumer, response.clone());
                        }
                    }
                }
                self.scheduler.schedule_after(self.sample_period, Event::ProducerTick);
            }

            Event::RequestArrival { consumer, request } => {
                if let Some(cached) = self.cache.get(&request.name, request.must_be_fresh, now).cloned() {
                    self.schedule_response_delivery(consumer, cached);
                } else {
                    match self.producer.handle_request(&request) {
                        RequestOutcome::Responded(response) => {
                            self.cache.put(response.clone(), now);
                            self.schedule_response_delivery(consumer, response);
                        }
                        RequestOutcome::Queued => {
                            self.pit.entry(request.name).or_default().push(consumer);
                        }
                        RequestOutcome::DuplicateDropped => {}
                    }
                }
            }

            Event::ResponseArrival { consumer, response } => {
                let effect = self.consumers[consumer].handle_response(
                    &response,
                    now,
                    &mut *self.consumer_sinks[consumer],
                )?;
                if let Some(seq) = effect.cancelled_seq {
                    self.outstanding_timeouts.remove(&(consumer, seq));
                }
                match effect.action {
                    ConsumerAction::Requests(requests) => {
                        for request in requests {
                            self.send_and_track(now, consumer, request);
                        }
                    }
                    ConsumerAction::RetryDiscoveryAfter(delay) => {
                        self.scheduler.schedule_after(delay, Event::RetryDiscovery { consumer });
                    }
                }
            }

            Event::Timeout { consumer, seq } => {
                let Some(&current) = self.outstanding_timeouts.get(&(consumer, seq)) else {
                    return Ok(());
                };
                let next = self.rto.backoff(current);
                self.outstanding_timeouts.insert((consumer, seq), next);
                self.scheduler.schedule_after(next, Event::Timeout { consumer, seq });
                if let Some(request) = self.consumers[consumer].handle_timeout(seq) {
                    self.route_request(now, consumer, request);
                }
            }

            Event::RetryDiscovery { consumer } => {
                let request = self.consumers[consumer].send_discovery(now);
                self.send_and_track(now, consumer, request);
            }
        }
        Ok(())
    }

    pub fn consumer(&self, index: usize) -> &Consumer {
        &self.consumers[index]
    }
}
