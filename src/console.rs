//! Commands accepted on stdin while the filter is attached.

use thiserror::Error;

pub const HELP: &str = "\
Available commands:
  port <number>  - Change the drop port (e.g. 'port 8080')
  status         - Show current statistics
  help           - Show this help message
  quit/exit      - Detach and exit
  Ctrl+C         - Detach and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Retarget the filter (host byte order, never 0)
    Port(u16),
    Status,
    Help,
    Quit,
    /// Blank line
    Empty,
    Unknown(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("usage: port <number> (e.g. port 8080)")]
    PortUsage,
    #[error("invalid port number '{0}': must be between 1-65535")]
    InvalidPort(String),
}

/// Parse one console line
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut parts = line.split_whitespace();

    let Some(word) = parts.next() else {
        return Ok(Command::Empty);
    };

    match word.to_lowercase().as_str() {
        "port" => {
            let (Some(arg), None) = (parts.next(), parts.next()) else {
                return Err(CommandError::PortUsage);
            };
            match arg.parse::<u16>() {
                Ok(port) if port != 0 => Ok(Command::Port(port)),
                _ => Err(CommandError::InvalidPort(arg.to_string())),
            }
        }
        "status" => Ok(Command::Status),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Ok(Command::Unknown(other.to_string())),
    }
}
