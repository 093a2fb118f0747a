use std::time::Duration;

/// Exponential-backoff retransmission timeout, mirroring the doubling timer used to
/// retransmit unanswered requests.
#[derive(Clone, Debug)]
pub struct RtoManager {
    initial: Duration,
    multiplier: f64,
    max: Duration,
}

impl RtoManager {
    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            initial,
            multiplier,
            max,
        }
    }

    pub fn initial_timeout(&self) -> Duration {
        self.initial
    }

    /// Returns the next timeout after a retransmission, clamped to `max`.
    pub fn backoff(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_clamped() {
        let rto = RtoManager::new(Duration::from_millis(100), 2.0, Duration::from_millis(350));
        let first = rto.initial_timeout();
        let second = rto.backoff(first);
        let third = rto.backoff(second);
        assert_eq!(first, Duration::from_millis(100));
        assert_eq!(second, Duration::from_millis(200));
        assert_eq!(third, Duration::from_millis(350));
    }
}
