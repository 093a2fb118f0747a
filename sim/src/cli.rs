use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rtc_common::cli::ObservabilityOpts;

/// Runs a simulated conference of one producer and one or more consumers and reports
/// the resulting retrieval-latency and window-size series to CSV.
#[derive(Clone, Parser)]
#[clap(author, version = rtc_common::version!(), about)]
pub struct Cli {
    #[clap(flatten)]
    pub observability: ObservabilityOpts,

    /// Name prefix shared by the conference.
    #[clap(long, default_value = "/conf")]
    pub conference_prefix: String,

    /// Name component identifying the simulated producer within the conference.
    #[clap(long, default_value = "/producer")]
    pub producer_prefix: String,

    /// Sampling rate, in frames per second.
    #[clap(long, default_value = "30")]
    pub sampling_rate: u32,

    /// Segments per delta frame.
    #[clap(long, default_value = "5")]
    pub segments_per_delta_frame: u32,

    /// Segments per key frame.
    #[clap(long, default_value = "30")]
    pub segments_per_key_frame: u32,

    /// Nominal freshness period of a response, in milliseconds.
    #[clap(long, default_value = "0")]
    pub freshness_ms: u64,

    /// Tweak the freshness period of delta responses to push slow consumers off stale
    /// caches.
    #[clap(long)]
    pub tweak_freshness: bool,

    /// Mean one-way link delay, in milliseconds.
    #[clap(long, default_value = "10")]
    pub link_delay_mean_ms: u64,

    /// Standard deviation of one-way link delay, in milliseconds.
    #[clap(long, default_value = "2")]
    pub link_delay_std_ms: u64,

    /// Initial retransmission timeout, in milliseconds.
    #[clap(long, default_value = "100")]
    pub rto_initial_ms: u64,

    /// Maximum retransmission timeout, in milliseconds.
    #[clap(long, default_value = "1000")]
    pub rto_max_ms: u64,

    /// How long to run the simulation, in milliseconds.
    #[clap(long, default_value = "5000")]
    pub duration_ms: u64,

    /// Seed for the link-delay random number generator.
    #[clap(long, default_value = "0")]
    pub seed: u64,

    /// Directory CSV output files are written to.
    #[clap(long, default_value = ".")]
    pub output_dir: PathBuf,

    #[command(subcommand)]
    pub mode: Mode,
}

impl Cli {
    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Clone, Subcommand)]
pub enum Mode {
    /// Run with a single simulated consumer.
    Single,

    /// Run with a fleet of consumers described by a JSON settings file.
    Defined(Defined),
}

#[derive(Clone, Parser)]
pub struct Defined {
    /// Path to the JSON file listing the consumers to simulate.
    pub file: PathBuf,
}

/// One entry of a [`Defined`] settings file: per-consumer pacing parameters.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ConsumerSettings {
    #[serde(default)]
    pub must_be_fresh_num: u32,
    #[serde(default = "default_interest_lifetime_ms")]
    pub interest_lifetime_ms: u64,
    #[serde(default)]
    pub print_lambda: bool,
}

fn default_interest_lifetime_ms() -> u64 {
    1000
}
