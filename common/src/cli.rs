//! Shared `clap`-derived option groups, flattened into the binaries that need them.
use std::{net::SocketAddr, time::Duration};

use clap::Parser;

/// Observability flags common to every binary in the workspace.
#[derive(Clone, Debug, Parser)]
pub struct ObservabilityOpts {
    /// Endpoint on which Prometheus text format metrics are available.
    #[clap(long, env, default_value = "127.0.0.1:9090")]
    pub observability_address: SocketAddr,

    /// If set, then OpenTelemetry data is sent to the URL specified, otherwise the standard
    /// tracing subscriber is used.
    #[clap(long)]
    pub otel_endpoint: Option<String>,

    /// All OpenTelemetry spans are emitted with this as the "service.namespace" property.
    #[clap(long, default_value = "")]
    pub otel_namespace: String,
}

/// Configuration surface of the producer engine (spec.md §6).
#[derive(Clone, Debug, Parser)]
pub struct ProducerCliOpts {
    /// Name prefix shared by the conference.
    #[clap(long)]
    pub conference_prefix: String,

    /// Name component identifying this producer within the conference.
    #[clap(long)]
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

    /// Virtual payload size for response content, in bytes.
    #[clap(long, default_value = "1024")]
    pub payload_size: usize,

    /// Nominal freshness period of a response, in milliseconds. 0 means unlimited.
    #[clap(long, default_value = "0")]
    pub freshness_ms: u64,

    /// Fake signature kind, 0 is a valid signature by convention.
    #[clap(long, default_value = "0")]
    pub signature: u32,

    /// Name to use as a key locator; omitted when not set.
    #[clap(long)]
    pub key_locator: Option<String>,

    /// Name of the per-segment generation CSV file.
    #[clap(long, default_value = "producer.csv")]
    pub filename: String,

    /// Tweak the freshness period of delta responses to push slow consumers off stale caches.
    #[clap(long)]
    pub tweak_freshness: bool,
}

impl ProducerCliOpts {
    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }
}

/// Configuration surface of the consumer engine (spec.md §6).
#[derive(Clone, Debug, Parser)]
pub struct ConsumerCliOpts {
    /// Name prefix of the delta namespace; its last component is stripped to form the
    /// discovery prefix.
    #[clap(long)]
    pub conference_prefix: String,

    /// Number of bootstrap attempts sent with the must-be-fresh flag set.
    #[clap(long, default_value = "1")]
    pub must_be_fresh_num: u32,

    /// Sampling rate, in frames per second. Must match the producer.
    #[clap(long, default_value = "30")]
    pub sampling_rate: u32,

    /// Nominal freshness period advertised by the producer, in milliseconds.
    #[clap(long, default_value = "0")]
    pub freshness_ms: u64,

    /// Segments per delta frame. Must match the producer.
    #[clap(long, default_value = "5")]
    pub segments_per_delta_frame: u32,

    /// Segments per key frame. Must match the producer.
    #[clap(long, default_value = "30")]
    pub segments_per_key_frame: u32,

    /// Name of the main per-response CSV file.
    #[clap(long, default_value = "consumer.csv")]
    pub filename: String,

    /// Name of the inter-arrival CSV file.
    #[clap(long, default_value = "consumer-interarrival.csv")]
    pub filename_interarrival: String,

    /// Print each λ update to stderr as it changes.
    #[clap(long)]
    pub print_lambda: bool,

    /// Diagnostic identifier for this consumer instance.
    #[clap(long, default_value = "0")]
    pub number: u32,

    /// Ideal RTT in milliseconds, used only to normalise bootstrap diagnostics.
    #[clap(long, default_value = "0")]
    pub rtt_ideal: u32,

    /// Maximum sequence number to request before stopping. Unbounded by default.
    #[clap(long, default_value_t = u32::MAX)]
    pub max_seq: u32,

    /// Lifetime attached to every outbound request, in milliseconds.
    #[clap(long, default_value = "2000")]
    pub interest_lifetime_ms: u64,
}

impl ConsumerCliOpts {
    pub fn freshness(&self) -> Duration {
        Duration::from_millis(self.freshness_ms)
    }

    pub fn interest_lifetime(&self) -> Duration {
        Duration::from_millis(self.interest_lifetime_ms)
    }
}
