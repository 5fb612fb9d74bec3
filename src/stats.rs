use std::fmt;

/// Snapshot of the XDP counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketStats {
    /// TCP/IPv4 frames the classifier parsed
    pub total_packets: u64,
    /// Connection attempts dropped
    pub dropped_packets: u64,
}

impl PacketStats {
    /// Parsed frames that were let through
    pub fn passed_packets(&self) -> u64 {
        self.total_packets.saturating_sub(self.dropped_packets)
    }

    /// Calculate drop rate percentage
    pub fn drop_rate(&self) -> f64 {
        if self.total_packets == 0 {
            0.0
        } else {
            (self.dropped_packets as f64 / self.total_packets as f64) * 100.0
        }
    }
}

impl fmt::Display for PacketStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} packets, dropped {} packets",
            self.total_packets, self.dropped_packets
        )
    }
}

/// Remembers the last sample so unchanged counters are not reported again.
#[derive(Debug, Default)]
pub struct StatsReporter {
    last: PacketStats,
}

impl StatsReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sample if either counter moved since the previous call
    pub fn observe(&mut self, sample: PacketStats) -> Option<PacketStats> {
        if sample == self.last {
            return None;
        }
        self.last = sample;
        Some(sample)
    }

    pub fn last(&self) -> PacketStats {
        self.last
    }
}
