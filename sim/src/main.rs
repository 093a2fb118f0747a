use std::fs::File;
use std::time::Duration;

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use miette::IntoDiagnostic;
use rtc_common::tracer::TracerOptions;
use rtc_common::{init_tracer, metrics as rtc_metrics};
use rtc_consumer::ConsumerConfig;
use rtc_net_sim::{CsvConsumerMetricsSink, CsvProducerMetricsSink, LinkDelay, RtoManager};
use rtc_producer::ProducerConfig;
use rtc_sim::cli::{Cli, ConsumerSettings, Mode};
use rtc_sim::Driver;
use rtc_wire::{frame::producer_base, Name};
use tracing::info;

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let tracer = init_tracer!(TracerOptions::new(
        cli.observability.otel_endpoint.as_deref(),
        cli.observability.otel_namespace.clone()
    ));

    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(cli.observability.observability_address)
        .install()
        .into_diagnostic()?;
    rtc_metrics::describe_all();

    let consumer_settings = match &cli.mode {
        Mode::Single => vec![ConsumerSettings {
            must_be_fresh_num: 1,
            interest_lifetime_ms: 1000,
            print_lambda: false,
        }],
        Mode::Defined(defined) => {
            let file = File::open(&defined.file).into_diagnostic()?;
            serde_json::from_reader(file).into_diagnostic()?
        }
    };

    let base = producer_base(
        &Name::parse(&cli.conference_prefix),
        &Name::parse(&cli.producer_prefix),
    );

    let producer_config = ProducerConfig {
        conference_prefix: Name::parse(&cli.conference_prefix),
        producer_prefix: Name::parse(&cli.producer_prefix),
        sampling_rate: cli.sampling_rate,
        segments_per_delta_frame: cli.segments_per_delta_frame,
        segments_per_key_frame: cli.segments_per_key_frame,
        freshness: cli.freshness(),
        tweak_freshness: cli.tweak_freshness,
        ..ProducerConfig::default()
    };

    let consumer_configs: Vec<ConsumerConfig> = consumer_settings
        .iter()
        .map(|settings| ConsumerConfig {
            conference_prefix: base.with_text("delta"),
            must_be_fresh_num: settings.must_be_fresh_num,
            sampling_rate: cli.sampling_rate,
            freshness: cli.freshness(),
            segments_per_delta_frame: cli.segments_per_delta_frame,
            segments_per_key_frame: cli.segments_per_key_frame,
            print_lambda: settings.print_lambda,
            interest_lifetime: Duration::from_millis(settings.interest_lifetime_ms),
            ..ConsumerConfig::default()
        })
        .collect();

    std::fs::create_dir_all(&cli.output_dir).into_diagnostic()?;
    let producer_sink = Box::new(
        CsvProducerMetricsSink::new(Box::new(
            File::create(cli.output_dir.join("producer.csv")).into_diagnostic()?,
        ))
        .into_diagnostic()?,
    );

    let mut consumer_sinks: Vec<Box<dyn rtc_net_sim::ConsumerMetricsSink>> = Vec::new();
    for index in 0..consumer_configs.len() {
        let retrieval = File::create(cli.output_dir.join(format!("consumer-{index}.csv"))).into_diagnostic()?;
        let inter_arrival =
            File::create(cli.output_dir.join(format!("consumer-{index}-interarrival.csv"))).into_diagnostic()?;
        consumer_sinks.push(Box::new(
            CsvConsumerMetricsSink::new(Box::new(retrieval), Box::new(inter_arrival)).into_diagnostic()?,
        ));
    }

    let link = LinkDelay::new(
        Duration::from_millis(cli.link_delay_mean_ms),
        Duration::from_millis(cli.link_delay_std_ms),
    );
    let rto = RtoManager::new(
        Duration::from_millis(cli.rto_initial_ms),
        2.0,
        Duration::from_millis(cli.rto_max_ms),
    );

    let mut driver = Driver::new(
        producer_config,
        consumer_configs,
        link,
        rto,
        producer_sink,
        consumer_sinks,
        cli.seed,
    );

    info!(use_otel = tracer.use_otel(), "starting simulation");
    driver.run_until(cli.duration()).into_diagnostic()?;

    Ok(())
}
