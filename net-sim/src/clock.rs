use std::time::Duration;

/// A point in simulated time, measured as an offset from the start of the run.
/// Distinct from [`std::time::Instant`] because the simulation clock only ever
/// advances by jumping to the next scheduled event, never by wall-clock polling.
pub type SimTime = Duration;
