use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use syngate::config::{Config, XdpMode};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "syngate")]
#[command(author = "AEGIS Team")]
#[command(version = "0.1.0")]
#[command(about = "XDP filter dropping TCP connection attempts to one port", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and attach the XDP program, then accept console commands
    Attach {
        /// TOML configuration file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Network interface name (e.g., eth0, lo)
        #[arg(short, long)]
        interface: Option<String>,

        /// TCP destination port whose SYNs are dropped
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to compiled eBPF program
        #[arg(long)]
        program: Option<PathBuf>,

        /// XDP attach mode
        #[arg(short, long, value_enum)]
        mode: Option<XdpMode>,

        /// Seconds between counter reads
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "syngate.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Attach {
            config,
            interface,
            port,
            program,
            mode,
            interval,
        } => {
            let mut cfg = match config {
                Some(path) => Config::from_file(&path)
                    .with_context(|| format!("Failed to load config from {:?}", path))?,
                None => Config::default(),
            };

            if let Some(interface) = interface {
                cfg.filter.interface = interface;
            }
            if let Some(port) = port {
                cfg.filter.drop_port = port;
            }
            if let Some(program) = program {
                cfg.filter.program = program;
            }
            if let Some(mode) = mode {
                cfg.filter.mode = mode;
            }
            if let Some(interval) = interval {
                cfg.monitor.report_interval_secs = interval;
            }

            cfg.validate()?;
            attach::run(cfg).await?;
        }
        Commands::InitConfig { output } => {
            Config::default()
                .to_file(&output)
                .with_context(|| format!("Failed to write config to {:?}", output))?;
            println!(
                "{} {}",
                "✅ Default configuration written to".bright_green(),
                output.display()
            );
        }
    }

    Ok(())
}

#[cfg(target_os = "linux")]
mod attach {
    use anyhow::Result;
    use colored::Colorize;
    use std::io::BufRead;
    use std::time::Duration;
    use syngate::classifier::DEFAULT_DROP_PORT;
    use syngate::config::Config;
    use syngate::control::{Controller, Flow};
    use syngate::ebpf_loader::EbpfLoader;
    use tokio::signal::unix::{signal, SignalKind};
    use tokio::sync::mpsc;
    use tracing::{info, warn};

    pub async fn run(cfg: Config) -> Result<()> {
        // Check if running as root (required for XDP)
        if !nix::unistd::Uid::effective().is_root() {
            eprintln!(
                "{}",
                "❌ Error: This program requires root privileges".bright_red()
            );
            eprintln!("   Please run with: sudo syngate attach --interface <if>");
            std::process::exit(1);
        }

        println!("{}", "Loading XDP program...".bright_cyan());
        println!(
            "  Program: {}",
            cfg.filter.program.display().to_string().bright_white()
        );
        println!("  Interface: {}", cfg.filter.interface.bright_yellow());
        println!(
            "  Drop port: {}",
            cfg.filter.drop_port.to_string().bright_green()
        );
        println!();

        let mut loader = EbpfLoader::load(&cfg.filter.program)?;
        loader.attach(&cfg.filter.interface, cfg.filter.mode)?;

        let mut controller = Controller::new(loader, cfg.filter.drop_port)?;

        info!("Counting incoming packets on {}..", cfg.filter.interface);
        match controller.handle().drop_port()? {
            Some(port) => info!("Current drop port: {}", port),
            None => warn!("Drop port not set, filter uses default {}", DEFAULT_DROP_PORT),
        }
        info!("Type 'help' for commands, 'quit' or Ctrl+C to exit");

        let result = event_loop(
            &mut controller,
            Duration::from_secs(cfg.monitor.report_interval_secs),
        )
        .await;

        let mut loader = controller.into_inner();
        loader.detach()?;
        println!("{}", "✅ XDP program detached".bright_green());

        result
    }

    async fn event_loop(
        controller: &mut Controller<EbpfLoader>,
        interval: Duration,
    ) -> Result<()> {
        let mut ticker = tokio::time::interval(interval);
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut lines = spawn_stdin_reader();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = controller.tick() {
                        warn!("Map lookup failed: {:#}", e);
                    }
                }
                Some(line) = lines.recv() => {
                    if controller.handle_line(&line) == Flow::Quit {
                        return Ok(());
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received signal, exiting..");
                    return Ok(());
                }
                _ = sigterm.recv() => {
                    info!("Received signal, exiting..");
                    return Ok(());
                }
            }
        }
    }

    /// Stdin is read on a plain thread; a blocked read must not hold up shutdown
    fn spawn_stdin_reader() -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(10);
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        rx
    }
}

#[cfg(not(target_os = "linux"))]
mod attach {
    use anyhow::{bail, Result};
    use syngate::config::Config;

    pub async fn run(_cfg: Config) -> Result<()> {
        bail!("XDP is only available on Linux")
    }
}
