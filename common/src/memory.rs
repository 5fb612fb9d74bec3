//! In-memory stores for running the classifier outside the kernel.

use core::sync::atomic::{AtomicU16, AtomicU64, Ordering};

use crate::store::{Counter, CounterStore, PortConfig};

/// `total`/`dropped` pair backed by process-wide atomics
#[derive(Debug, Default)]
pub struct SharedCounters {
    total: AtomicU64,
    dropped: AtomicU64,
}

impl SharedCounters {
    pub const fn new() -> Self {
        Self {
            total: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Total => self.total(),
            Counter::Dropped => self.dropped(),
        }
    }
}

impl CounterStore for SharedCounters {
    #[inline(always)]
    fn increment(&self, counter: Counter) {
        let cell = match counter {
            Counter::Total => &self.total,
            Counter::Dropped => &self.dropped,
        };
        cell.fetch_add(1, Ordering::Relaxed);
    }
}

/// Port fixed at construction
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticPort(Option<u16>);

impl StaticPort {
    /// `port` in host byte order
    pub const fn new(port: u16) -> Self {
        Self(Some(port.to_be()))
    }

    pub const fn unset() -> Self {
        Self(None)
    }
}

impl PortConfig for StaticPort {
    #[inline(always)]
    fn drop_port(&self) -> Option<u16> {
        self.0
    }
}

/// Port cell that can be rewritten while classifiers read it.
/// Holds network byte order; 0 means unset, like the kernel map slot.
#[derive(Debug, Default)]
pub struct AtomicPort(AtomicU16);

impl AtomicPort {
    pub const fn unset() -> Self {
        Self(AtomicU16::new(0))
    }

    /// `port` in host byte order; 0 clears the cell
    pub fn set(&self, port: u16) {
        self.0.store(port.to_be(), Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

impl PortConfig for AtomicPort {
    #[inline(always)]
    fn drop_port(&self) -> Option<u16> {
        match self.0.load(Ordering::Relaxed) {
            0 => None,
            port => Some(port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_counters_increment_independently() {
        let counters = SharedCounters::new();
        counters.increment(Counter::Total);
        counters.increment(Counter::Total);
        counters.increment(Counter::Dropped);

        assert_eq!(counters.total(), 2);
        assert_eq!(counters.get(Counter::Dropped), 1);
    }

    #[test]
    fn test_atomic_port_zero_is_unset() {
        let port = AtomicPort::unset();
        assert_eq!(port.drop_port(), None);

        port.set(8080);
        assert_eq!(port.drop_port(), Some(8080u16.to_be()));

        port.clear();
        assert_eq!(port.drop_port(), None);
    }

    #[test]
    fn test_static_port_network_order() {
        assert_eq!(StaticPort::new(22).drop_port(), Some(22u16.to_be()));
        assert_eq!(StaticPort::unset().drop_port(), None);
    }
}
