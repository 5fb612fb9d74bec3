use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use syngate_common::DEFAULT_DROP_PORT;
use thiserror::Error;

/// Linux IFNAMSIZ, trailing NUL included
const IFNAMSIZ: usize = 16;

/// Default location of the compiled XDP object
pub const DEFAULT_PROGRAM_PATH: &str =
    "ebpf/syngate-filter/target/bpfel-unknown-none/release/syngate-filter";

/// Loader configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Interface to attach the XDP program to
    pub interface: String,
    /// TCP destination port whose SYNs are dropped
    pub drop_port: u16,
    /// Path to the compiled eBPF object
    pub program: PathBuf,
    /// XDP attach mode
    pub mode: XdpMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between counter reads
    pub report_interval_secs: u64,
}

/// How the program is attached to the driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum XdpMode {
    /// Generic (SKB) mode, works on any interface
    #[default]
    Skb,
    /// Driver (native) mode
    Native,
    /// Offloaded to the NIC
    Hw,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid drop port: cannot be 0")]
    ZeroPort,
    #[error("interface name must not be empty")]
    EmptyInterface,
    #[error("interface name '{0}' is longer than {max} bytes", max = IFNAMSIZ - 1)]
    InterfaceTooLong(String),
    #[error("report interval must be > 0 seconds")]
    ZeroInterval,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            interface: "lo".to_string(),
            drop_port: DEFAULT_DROP_PORT,
            program: PathBuf::from(DEFAULT_PROGRAM_PATH),
            mode: XdpMode::Skb,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 1,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(&self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.drop_port == 0 {
            return Err(ConfigError::ZeroPort);
        }

        if self.filter.interface.is_empty() {
            return Err(ConfigError::EmptyInterface);
        }

        if self.filter.interface.len() >= IFNAMSIZ {
            return Err(ConfigError::InterfaceTooLong(self.filter.interface.clone()));
        }

        if self.monitor.report_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(())
    }
}
