use anyhow::{anyhow, bail, Context, Result};
use aya::{
    maps::Array,
    programs::{xdp::XdpLinkId, Xdp, XdpFlags},
    Bpf,
};
use aya_log::BpfLogger;
use std::path::Path;
use syngate_common::{Counter, CONFIG_DROP_PORT, CONFIG_MAP, COUNTERS_MAP, PROGRAM_NAME};
use tracing::{info, warn};

use crate::config::XdpMode;
use crate::control::FilterHandle;
use crate::stats::PacketStats;

impl From<XdpMode> for XdpFlags {
    fn from(mode: XdpMode) -> Self {
        match mode {
            XdpMode::Skb => XdpFlags::SKB_MODE,
            XdpMode::Native => XdpFlags::DRV_MODE,
            XdpMode::Hw => XdpFlags::HW_MODE,
        }
    }
}

/// eBPF program loader and manager
pub struct EbpfLoader {
    ebpf: Bpf,
    interface: String,
    attached: bool,
    link_id: Option<XdpLinkId>,
}

impl EbpfLoader {
    /// Load eBPF program from file
    pub fn load(program_path: &Path) -> Result<Self> {
        let ebpf_data = std::fs::read(program_path)
            .with_context(|| format!("Failed to read eBPF program from {:?}", program_path))?;

        let mut ebpf = Bpf::load(&ebpf_data).context("Failed to load eBPF program")?;

        // Only fails when the object has no log statements compiled in
        if let Err(e) = BpfLogger::init(&mut ebpf) {
            warn!("eBPF logger unavailable: {}", e);
        }

        Ok(Self {
            ebpf,
            interface: String::new(),
            attached: false,
            link_id: None,
        })
    }

    /// Attach XDP program to network interface
    pub fn attach(&mut self, interface: &str, mode: XdpMode) -> Result<()> {
        if self.attached {
            bail!("XDP program already attached to {}", self.interface);
        }

        info!("Attaching XDP program to interface: {} ({:?} mode)", interface, mode);

        let program = self.program_mut()?;
        program.load().context("Failed to load XDP program")?;

        let link_id = program
            .attach(interface, mode.into())
            .context("Failed to attach XDP program to interface")?;

        self.interface = interface.to_string();
        self.attached = true;
        self.link_id = Some(link_id);

        info!("XDP program attached successfully to {}", interface);
        Ok(())
    }

    /// Detach XDP program from interface
    pub fn detach(&mut self) -> Result<()> {
        if !self.attached {
            return Ok(());
        }

        if let Some(link_id) = self.link_id.take() {
            self.program_mut()?.detach(link_id)?;

            self.attached = false;
            info!("XDP program detached from {}", self.interface);
        }
        Ok(())
    }

    /// Set the TCP destination port whose SYNs are dropped
    pub fn set_drop_port(&mut self, port: u16) -> Result<()> {
        if port == 0 {
            bail!("Invalid drop port: cannot be 0");
        }

        let mut config: Array<_, u16> = Array::try_from(
            self.ebpf
                .map_mut(CONFIG_MAP)
                .ok_or_else(|| anyhow!("{} map not found", CONFIG_MAP))?,
        )?;

        // The filter compares against the raw header field
        config
            .set(CONFIG_DROP_PORT, port.to_be(), 0)
            .context("Failed to set drop port")?;

        info!("Drop port set to: {}", port);
        Ok(())
    }

    /// Currently configured drop port, `None` if never set
    pub fn drop_port(&self) -> Result<Option<u16>> {
        let config: Array<_, u16> = Array::try_from(
            self.ebpf
                .map(CONFIG_MAP)
                .ok_or_else(|| anyhow!("{} map not found", CONFIG_MAP))?,
        )?;

        let raw = config
            .get(&CONFIG_DROP_PORT, 0)
            .context("Failed to read drop port")?;

        Ok(match raw {
            0 => None,
            port => Some(u16::from_be(port)),
        })
    }

    /// Get current statistics
    pub fn get_stats(&self) -> Result<PacketStats> {
        let counters: Array<_, u64> = Array::try_from(
            self.ebpf
                .map(COUNTERS_MAP)
                .ok_or_else(|| anyhow!("{} map not found", COUNTERS_MAP))?,
        )?;

        let total_packets = counters
            .get(&Counter::Total.index(), 0)
            .context("Failed to read total counter")?;
        let dropped_packets = counters
            .get(&Counter::Dropped.index(), 0)
            .context("Failed to read dropped counter")?;

        Ok(PacketStats {
            total_packets,
            dropped_packets,
        })
    }

    fn program_mut(&mut self) -> Result<&mut Xdp> {
        let program: &mut Xdp = self
            .ebpf
            .program_mut(PROGRAM_NAME)
            .ok_or_else(|| anyhow!("XDP program not found"))?
            .try_into()
            .context("Program is not XDP type")?;
        Ok(program)
    }
}

impl FilterHandle for EbpfLoader {
    fn set_drop_port(&mut self, port: u16) -> Result<()> {
        EbpfLoader::set_drop_port(self, port)
    }

    fn get_stats(&self) -> Result<PacketStats> {
        EbpfLoader::get_stats(self)
    }
}

impl Drop for EbpfLoader {
    fn drop(&mut self) {
        if self.attached {
            if let Err(e) = self.detach() {
                warn!("Failed to detach XDP program on drop: {}", e);
            }
        }
    }
}
