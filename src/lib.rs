// Library interface for syngate components
// Keeps config, console and reporting logic testable without a kernel

pub mod config;
pub mod console;
pub mod control;
pub mod stats;

#[cfg(target_os = "linux")]
pub mod ebpf_loader;

pub use syngate_common as classifier;
