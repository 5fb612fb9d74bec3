// Shared between the XDP program and userspace.
// Keep this crate `no_std` and allocation-free so it links into eBPF code.

#![cfg_attr(not(test), no_std)]

pub mod classifier;
pub mod frame;
pub mod headers;
pub mod store;

#[cfg(any(feature = "user", test))]
pub mod memory;

pub use classifier::{Classifier, ParseError, Verdict};
pub use frame::Frame;
pub use headers::{EthHdr, Header, Ipv4Hdr, TcpHdr};
pub use store::{Counter, CounterStore, PortConfig};

// Protocol constants
pub const ETH_P_IP: u16 = 0x0800;
pub const IPPROTO_TCP: u8 = 6;
pub const TCP_FLAG_SYN: u8 = 0x02;
pub const TCP_FLAG_ACK: u8 = 0x10;

/// Port targeted when the configuration slot is unset (host byte order)
pub const DEFAULT_DROP_PORT: u16 = 4040;

// Map names (must match the `#[map]` statics in the XDP program)
pub const CONFIG_MAP: &str = "CONFIG";
pub const COUNTERS_MAP: &str = "PKT_COUNT";

// Configuration slots
pub const CONFIG_DROP_PORT: u32 = 0;
pub const CONFIG_SLOTS: u32 = 1;

// Counter slots
pub const COUNTER_TOTAL: u32 = 0;
pub const COUNTER_DROPPED: u32 = 1;
pub const COUNTER_SLOTS: u32 = 2;

/// Name of the XDP entry point inside the compiled object
pub const PROGRAM_NAME: &str = "syngate_filter";
