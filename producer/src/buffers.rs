use std::collections::{HashSet, VecDeque};

use rtc_wire::Name;

/// Ordered, bounded history of every segment name produced so far. Oldest entries are
/// evicted once `capacity` is exceeded.
#[derive(Debug)]
pub struct GeneratedBuffer {
    order: VecDeque<Name>,
    present: HashSet<Name>,
    capacity: usize,
}

impl GeneratedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            present: HashSet::new(),
            capacity,
        }
    }

    pub fn push(&mut self, name: Name) {
        if self.order.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.present.remove(&evicted);
            }
        }
        self.present.insert(name.clone());
        self.order.push_back(name);
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.present.contains(name)
    }

    /// Scans from the most recently generated entry backwards for one whose component
    /// at index 2 equals `kind` (`"key"` or `"delta"`). Falls back to the single most
    /// recent entry overall when no such entry exists, matching the original producer's
    /// exploration-request fallback.
    pub fn last_matching(&self, kind: &str) -> Option<&Name> {
        self.order
            .iter()
            .rev()
            .find(|name| name.text_at(2).ok() == Some(kind))
            .or_else(|| self.order.back())
    }
}

/// Ordered, de-duplicated set of request names awaiting generation.
#[derive(Debug, Default)]
pub struct PendingBuffer {
    order: VecDeque<Name>,
    present: HashSet<Name>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.present.contains(name)
    }

    /// Returns `false` without modifying the buffer if `name` is already pending.
    pub fn push(&mut self, name: Name) -> bool {
        if self.present.contains(&name) {
            return false;
        }
        self.present.insert(name.clone());
        self.order.push_back(name);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Removes and returns up to `limit` entries whose name has `prefix` as a prefix,
    /// preserving the relative order of everything left behind.
    pub fn drain_matching(&mut self, prefix: &Name, limit: usize) -> Vec<Name> {
        let mut matched = Vec::new();
        let mut kept = VecDeque::new();
        for name in self.order.drain(..) {
            if matched.len() < limit && prefix.is_prefix_of(&name) {
                self.present.remove(&name);
                matched.push(name);
            } else {
                kept.push_back(name);
            }
        }
        self.order = kept;
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_buffer_evicts_oldest_past_capacity() {
        let mut buffer = GeneratedBuffer::new(2);
        buffer.push(Name::parse("/a/0"));
        buffer.push(Name::parse("/a/1"));
        buffer.push(Name::parse("/a/2"));

        assert!(!buffer.contains(&Name::parse("/a/0")));
        assert!(buffer.contains(&Name::parse("/a/1")));
        assert!(buffer.contains(&Name::parse("/a/2")));
    }

    #[test]
    fn pending_buffer_deduplicates_on_push() {
        let mut buffer = PendingBuffer::new();
        assert!(buffer.push(Name::parse("/conf/producer/key/0/0")));
        assert!(!buffer.push(Name::parse("/conf/producer/key/0/0")));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn drain_matching_respects_limit_and_preserves_remaining_order() {
        let mut buffer = PendingBuffer::new();
        buffer.push(Name::parse("/conf/producer/key/0/0"));
        buffer.push(Name::parse("/conf/producer/key/0/1"));
        buffer.push(Name::parse("/conf/producer/key/0/2"));
        buffer.push(Name::parse("/conf/producer/delta/0/paired-key/0/0"));

        let matched = buffer.drain_matching(&Name::parse("/conf/producer/key/0"), 2);
        assert_eq!(matched.len(), 2);
        assert_eq!(buffer.len(), 2);
        assert!(buffer.contains(&Name::parse("/conf/producer/key/0/2")));
        assert!(buffer.contains(&Name::parse("/conf/producer/delta/0/paired-key/0/0")));
    }
}
