//! Capabilities the classifier is handed at construction.
//!
//! The XDP program backs them with BPF maps; userspace and tests back them
//! with plain atomics (see `memory`).

use crate::{COUNTER_DROPPED, COUNTER_TOTAL};

/// Read-only access to the configured drop port.
pub trait PortConfig {
    /// Configured port in network byte order, `None` when unset
    fn drop_port(&self) -> Option<u16>;
}

/// Counter identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Counter {
    /// Frames that parsed as Ethernet/IPv4/TCP
    Total,
    /// Frames dropped as connection attempts to the drop port
    Dropped,
}

impl Counter {
    /// Slot of this counter in the counters map
    #[inline(always)]
    pub const fn index(self) -> u32 {
        match self {
            Counter::Total => COUNTER_TOTAL,
            Counter::Dropped => COUNTER_DROPPED,
        }
    }
}

/// Shared monotonic counters.
///
/// `increment` must be an atomic add: it runs concurrently on every receive
/// queue.
pub trait CounterStore {
    fn increment(&self, counter: Counter);
}

impl<T: PortConfig + ?Sized> PortConfig for &T {
    #[inline(always)]
    fn drop_port(&self) -> Option<u16> {
        (**self).drop_port()
    }
}

impl<T: CounterStore + ?Sized> CounterStore for &T {
    #[inline(always)]
    fn increment(&self, counter: Counter) {
        (**self).increment(counter)
    }
}
