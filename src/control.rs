//! Live control of an attached filter: console commands and counter reports.

use anyhow::Result;
use colored::Colorize;
use tracing::{info, warn};

use crate::console::{parse_command, Command, HELP};
use crate::stats::{PacketStats, StatsReporter};

/// What the controller needs from a running filter
pub trait FilterHandle {
    /// Retarget the filter (host byte order)
    fn set_drop_port(&mut self, port: u16) -> Result<()>;

    /// Read the counters
    fn get_stats(&self) -> Result<PacketStats>;
}

/// Whether the runtime loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Controller<H> {
    handle: H,
    port: u16,
    reporter: StatsReporter,
}

impl<H: FilterHandle> Controller<H> {
    /// Take over `handle` and program the initial drop port
    pub fn new(mut handle: H, port: u16) -> Result<Self> {
        handle.set_drop_port(port)?;
        Ok(Self {
            handle,
            port,
            reporter: StatsReporter::new(),
        })
    }

    /// Current drop port (host byte order)
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn into_inner(self) -> H {
        self.handle
    }

    /// Periodic read; returns the sample only when a counter moved
    pub fn tick(&mut self) -> Result<Option<PacketStats>> {
        let sample = self.handle.get_stats()?;
        let changed = self.reporter.observe(sample);
        if let Some(stats) = changed {
            info!("{} (port {})", stats, self.port);
        }
        Ok(changed)
    }

    /// Run one console line
    pub fn handle_line(&mut self, line: &str) -> Flow {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("{}", e);
                return Flow::Continue;
            }
        };

        match command {
            Command::Port(port) => match self.handle.set_drop_port(port) {
                Ok(()) => {
                    self.port = port;
                    info!("Port changed to {}", port);
                }
                Err(e) => warn!("Error updating port: {:#}", e),
            },
            Command::Status => match self.handle.get_stats() {
                Ok(stats) => info!(
                    "Status: Total packets: {}, Dropped: {}, Current port: {}",
                    stats.total_packets, stats.dropped_packets, self.port
                ),
                Err(e) => warn!("Error reading counters: {:#}", e),
            },
            Command::Help => println!("\n{}\n", HELP.bright_cyan()),
            Command::Quit => {
                info!("Exiting...");
                return Flow::Quit;
            }
            Command::Empty => {}
            Command::Unknown(word) => warn!(
                "Unknown command: {}. Type 'help' for available commands",
                word
            ),
        }

        Flow::Continue
    }
}
