use std::io::Write;
use std::time::Duration;

use rtc_wire::Name;
use thiserror::Error;

use crate::clock::SimTime;

#[derive(Debug, Error)]
pub enum MetricsSinkError {
    #[error("failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),
}

/// Written by a producer: one row per frame generated.
pub trait ProducerMetricsSink {
    fn record_generation(&mut self, time: SimTime, frame_name: &Name) -> Result<(), MetricsSinkError>;
}

/// Written by a consumer: one row per frame retrieval, and one row per inter-arrival
/// sample used to classify cache freshness.
pub trait ConsumerMetricsSink {
    fn record_retrieval(
        &mut self,
        time: SimTime,
        rtt: Duration,
        frame_name: &Name,
    ) -> Result<(), MetricsSinkError>;

    fn record_inter_arrival(
        &mut self,
        time: SimTime,
        inter_arrival: Duration,
        frame_name: &Name,
    ) -> Result<(), MetricsSinkError>;
}

/// CSV-backed [`ProducerMetricsSink`] with header `Generation Time,Frame Name`.
pub struct CsvProducerMetricsSink {
    writer: csv::Writer<Box<dyn Write + Send>>,
}

impl CsvProducerMetricsSink {
    pub fn new(sink: Box<dyn Write + Send>) -> Result<Self, MetricsSinkError> {
        let mut writer = csv::WriterBuilder::new().from_writer(sink);
        writer.write_record(["Generation Time", "Frame Name"])?;
        Ok(Self { writer })
    }
}

impl ProducerMetricsSink for CsvProducerMetricsSink {
    fn record_generation(&mut self, time: SimTime, frame_name: &Name) -> Result<(), MetricsSinkError> {
        self.writer
            .write_record([time.as_secs_f64().to_string(), frame_name.to_string()])?;
        self.writer.flush()?;
        Ok(())
    }
}

/// CSV-backed [`ConsumerMetricsSink`], writing the retrieval-latency series (header
/// `Time,RTT,Frame Name`) and the inter-arrival series (header `Time,Darr,Frame Name`)
/// to two independent writers.
pub struct CsvConsumerMetricsSink {
    retrieval: csv::Writer<Box<dyn Write + Send>>,
    inter_arrival: csv::Writer<Box<dyn Write + Send>>,
}

impl CsvConsumerMetricsSink {
    pub fn new(
        retrieval_sink: Box<dyn Write + Send>,
        inter_arrival_sink: Box<dyn Write + Send>,
    ) -> Result<Self, MetricsSinkError> {
        let mut retrieval = csv::WriterBuilder::new().from_writer(retrieval_sink);
        retrieval.write_record(["Time", "RTT", "Frame Name"])?;

        let mut inter_arrival = csv::WriterBuilder::new().from_writer(inter_arrival_sink);
        inter_arrival.write_record(["Time", "Darr", "Frame Name"])?;

        Ok(Self {
            retrieval,
            inter_arrival,
        })
    }
}

impl ConsumerMetricsSink for CsvConsumerMetricsSink {
    fn record_retrieval(
        &mut self,
        time: SimTime,
        rtt: Duration,
        frame_name: &Name,
    ) -> Result<(), MetricsSinkError> {
        self.retrieval.write_record([
            time.as_secs_f64().to_string(),
            rtt.as_secs_f64().to_string(),
            frame_name.to_string(),
        ])?;
        self.retrieval.flush()?;
        Ok(())
    }

    fn record_inter_arrival(
        &mut self,
        time: SimTime,
        inter_arrival: Duration,
        frame_name: &Name,
    ) -> Result<(), MetricsSinkError> {
        self.inter_arrival.write_record([
            time.as_secs_f64().to_string(),
            inter_arrival.as_secs_f64().to_string(),
            frame_name.to_string(),
        ])?;
        self.inter_arrival.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_sink_writes_header_and_rows() {
        let buffer: Vec<u8> = Vec::new();
        let mut sink = CsvProducerMetricsSink::new(Box::new(buffer)).unwrap();
        sink.record_generation(Duration::from_millis(40), &Name::parse("/conf/producer/key/0/0"))
            .unwrap();
    }

    #[test]
    fn consumer_sink_writes_both_series() {
        let retrieval: Vec<u8> = Vec::new();
        let inter_arrival: Vec<u8> = Vec::new();
        let mut sink = CsvConsumerMetricsSink::new(Box::new(retrieval), Box::new(inter_arrival)).unwrap();
        sink.record_retrieval(
            Duration::from_millis(80),
            Duration::from_millis(40),
            &Name::parse("/conf/producer/delta/1/paired-key/0/0"),
        )
        .unwrap();
        sink.record_inter_arrival(
            Duration::from_millis(80),
            Duration::from_millis(33),
            &Name::parse("/conf/producer/delta/1/paired-key/0/0"),
        )
        .unwrap();
    }
}
