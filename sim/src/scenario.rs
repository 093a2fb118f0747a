use std::time::Duration;

use rtc_consumer::ConsumerConfig;
use rtc_net_sim::{ConsumerMetricsSink, LinkDelay, MetricsSinkError, ProducerMetricsSink, RtoManager, SimTime};
use rtc_producer::ProducerConfig;
use rtc_wire::Name;

use crate::driver::Driver;

struct NullProducerSink;
impl ProducerMetricsSink for NullProducerSink {
    fn record_generation(&mut self, _time: SimTime, _frame_name: &Name) -> Result<(), MetricsSinkError> {
        Ok(())
    }
}

struct NullConsumerSink;
impl ConsumerMetricsSink for NullConsumerSink {
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

fn producer_config() -> ProducerConfig {
    ProducerConfig {
        conference_prefix: Name::parse("/conf"),
        producer_prefix: Name::parse("/producer"),
        sampling_rate: 30,
        segments_per_delta_frame: 5,
        segments_per_key_frame: 30,
        ..ProducerConfig::default()
    }
}

fn consumer_config() -> ConsumerConfig {
    ConsumerConfig {
        conference_prefix: Name::parse("/conf/producer/delta"),
        must_be_fresh_num: 1,
        sampling_rate: 30,
        segments_per_delta_frame: 5,
        segments_per_key_frame: 30,
        ..ConsumerConfig::default()
    }
}

#[test]
fn single_consumer_bootstraps_and_derives_a_positive_window() {
    let mut driver = Driver::new(
        producer_config(),
        vec![consumer_config()],
        LinkDelay::fixed(Duration::from_millis(10)),
        RtoManager::new(Duration::from_millis(100), 2.0, Duration::from_millis(1000)),
        Box::new(NullProducerSink),
        vec![Box::new(NullConsumerSink)],
        42,
    );

    driver.run_until(Duration::from_millis(2000)).unwrap();

    let consumer = driver.consumer(0);
    assert!(consumer.bootstrap_done());
    assert!(consumer.lambda() >= 1);
}

#[test]
fn drd_and_window_stay_positive_under_jittered_links() {
    let mut driver = Driver::new(
        producer_config(),
        vec![consumer_config()],
        LinkDelay::new(Duration::from_millis(15), Duration::from_millis(3)),
        RtoManager::new(Duration::from_millis(100), 2.0, Duration::from_millis(1000)),
        Box::new(NullProducerSink),
        vec![Box::new(NullConsumerSink)],
        7,
    );

    driver.run_until(Duration::from_millis(5000)).unwrap();

    let consumer = driver.consumer(0);
    assert!(consumer.bootstrap_done());
    assert!(consumer.drd() > Duration::ZERO);
    assert!(consumer.lambda() >= 1);
}

#[test]
fn a_fleet_of_consumers_bootstraps_independently() {
    let configs = vec![consumer_config(), consumer_config(), consumer_config()];
    let sinks: Vec<Box<dyn ConsumerMetricsSink>> =
        (0..configs.len()).map(|_| Box::new(NullConsumerSink) as Box<dyn ConsumerMetricsSink>).collect();

    let mut driver = Driver::new(
        producer_config(),
        configs,
        LinkDelay::new(Duration::from_millis(12), Duration::from_millis(4)),
        RtoManager::new(Duration::from_millis(100), 2.0, Duration::from_millis(1000)),
        Box::new(NullProducerSink),
        sinks,
        99,
    );

    driver.run_until(Duration::from_millis(3000)).unwrap();

    for index in 0..3 {
        assert!(driver.consumer(index).bootstrap_done());
    }
}
