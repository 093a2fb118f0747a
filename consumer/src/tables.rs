use std::collections::{HashMap, VecDeque};

use rtc_net_sim::SimTime;
use rtc_wire::Name;

/// An ordered table of `(name, sendTime)` pairs, as described for the consumer's
/// in-flight request tables.
#[derive(Debug, Default)]
pub struct OutstandingTable {
    entries: VecDeque<(Name, SimTime)>,
}

impl OutstandingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: Name, sent_at: SimTime) {
        self.entries.push_back((name, sent_at));
    }

    /// Removes and returns the send time of the entry matching `name`, if any.
    pub fn take(&mut self, name: &Name) -> Option<SimTime> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        self.entries.remove(index).map(|(_, sent_at)| sent_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps a local monotonic sequence number to the request name it was assigned to,
/// used to route timeout notifications and response cancellations back to a name.
#[derive(Debug, Default)]
pub struct AllOutstanding {
    entries: VecDeque<(u64, Name)>,
}

impl AllOutstanding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, seq: u64, name: Name) {
        self.entries.push_back((seq, name));
    }

    pub fn seq_for_name(&self, name: &Name) -> Option<u64> {
        self.entries.iter().find(|(_, n)| n == name).map(|(s, _)| *s)
    }

    /// Coarse match used for discovery responses: any stored request whose name's
    /// component 2 equals `"discovery"`.
    pub fn seq_for_discovery(&self) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, n)| n.text_at(2).ok() == Some("discovery"))
            .map(|(s, _)| *s)
    }

    pub fn name_for_seq(&self, seq: u64) -> Option<&Name> {
        self.entries.iter().find(|(s, _)| *s == seq).map(|(_, n)| n)
    }

    pub fn remove(&mut self, seq: u64) {
        if let Some(index) = self.entries.iter().position(|(s, _)| *s == seq) {
            self.entries.remove(index);
        }
    }
}

/// Per-frame remaining-segment counters, keyed by `(keyId, deltaId)`. Strictly
/// equivalent to adjacency-based last-segment detection under a non-reordering
/// pipeline, and robust to reordering within it.
#[derive(Debug, Default)]
pub struct FrameSegmentCounters {
    remaining: HashMap<(u64, u64), u32>,
}

impl FrameSegmentCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_frame(&mut self, key_id: u64, delta_id: u64, segment_count: u32) {
        self.remaining.insert((key_id, delta_id), segment_count);
    }

    /// Decrements the counter for `(keyId, deltaId)` and returns `true` if this was the
    /// frame's last outstanding segment.
    pub fn segment_received(&mut self, key_id: u64, delta_id: u64) -> bool {
        let Some(count) = self.remaining.get_mut(&(key_id, delta_id)) else {
            return false;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.remaining.remove(&(key_id, delta_id));
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn outstanding_table_take_removes_matching_entry() {
        let mut table = OutstandingTable::new();
        table.push(Name::parse("/a/0"), Duration::from_millis(10));
        table.push(Name::parse("/a/1"), Duration::from_millis(20));

        assert_eq!(table.take(&Name::parse("/a/0")), Some(Duration::from_millis(10)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.take(&Name::parse("/a/0")), None);
    }

    #[test]
    fn frame_segment_counters_reports_last_segment() {
        let mut counters = FrameSegmentCounters::new();
        counters.start_frame(1, 7, 5);
        assert!(!counters.segment_received(1, 7));
        assert!(!counters.segment_received(1, 7));
        assert!(!counters.segment_received(1, 7));
        assert!(!counters.segment_received(1, 7));
        assert!(counters.segment_received(1, 7));
    }

    #[test]
    fn discovery_coarse_match_ignores_exact_name() {
        let mut all = AllOutstanding::new();
        all.push(0, Name::parse("/conf/producer/discovery"));
        assert_eq!(
            all.seq_for_discovery(),
            Some(0)
        );
        assert_eq!(all.seq_for_name(&Name::parse("/conf/producer/discovery/0/5")), None);
    }
}
