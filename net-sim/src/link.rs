use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use rtc_wire::{Name, Response};

use crate::clock::SimTime;

/// Samples one-way link delay as a clamped Gaussian, matching the jittered-delay links
/// used in the original simulation scenarios.
pub struct LinkDelay {
    mean: Duration,
    normal: Normal<f64>,
}

impl LinkDelay {
    pub fn new(mean: Duration, std_dev: Duration) -> Self {
        let normal = Normal::new(mean.as_secs_f64(), std_dev.as_secs_f64())
            .unwrap_or_else(|_| Normal::new(mean.as_secs_f64(), 0.0).expect("zero std dev is always valid"));
        Self { mean, normal }
    }

    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, Duration::ZERO)
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Duration {
        let seconds = self.normal.sample(rng).max(0.0);
        Duration::from_secs_f64(seconds)
    }

    pub fn mean(&self) -> Duration {
        self.mean
    }
}

struct CacheEntry {
    response: Response,
    inserted_at: SimTime,
}

/// An in-network cache keyed by exact name, modelling a single caching relay between a
/// consumer and a producer. A cached entry satisfies a request when its freshness period
/// has not elapsed, or when the request does not demand a fresh copy.
#[derive(Default)]
pub struct CacheStore {
    entries: HashMap<Name, CacheEntry>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, response: Response, now: SimTime) {
        self.entries.insert(
            response.name.clone(),
            CacheEntry {
                response,
                inserted_at: now,
            },
        );
    }

    pub fn get(&self, name: &Name, must_be_fresh: bool, now: SimTime) -> Option<&Response> {
        let entry = self.entries.get(name)?;
        let is_fresh = now.saturating_sub(entry.inserted_at) < entry.response.freshness_period;
        if must_be_fresh && !is_fresh {
            return None;
        }
        Some(&entry.response)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn must_be_fresh_rejects_expired_entries() {
        let mut cache = CacheStore::new();
        let response = Response::new(Name::parse("/conf/producer/key/0/0"), vec![1, 2, 3], Duration::from_millis(100));
        cache.put(response, Duration::from_millis(0));

        assert!(cache.get(&Name::parse("/conf/producer/key/0/0"), true, Duration::from_millis(50)).is_some());
        assert!(cache.get(&Name::parse("/conf/producer/key/0/0"), true, Duration::from_millis(150)).is_none());
        assert!(cache.get(&Name::parse("/conf/producer/key/0/0"), false, Duration::from_millis(150)).is_some());
    }

    #[test]
    fn fixed_delay_has_zero_variance() {
        let delay = LinkDelay::fixed(Duration::from_millis(40));
        let mut rng = rand::rng();
        for _ in 0..10 {
            assert_eq!(delay.sample(&mut rng), Duration::from_millis(40));
        }
    }
}
