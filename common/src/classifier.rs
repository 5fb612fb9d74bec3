//! Per-packet SYN classifier.
//!
//! Walks Ethernet -> IPv4 -> TCP with a bounds check before every header is
//! read. Anything that cannot be parsed is passed (fail open). Frames that do
//! parse are counted, and a pure SYN to the drop port is dropped and counted
//! again.
//!
//! The hot path never allocates, never loops and never blocks, so the same
//! code runs inside the XDP program and in userspace tests.

use crate::frame::Frame;
use crate::headers::{EthHdr, Header, Ipv4Hdr, TcpHdr};
use crate::store::{Counter, CounterStore, PortConfig};
use crate::{DEFAULT_DROP_PORT, ETH_P_IP, IPPROTO_TCP};

/// Classifier outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the frame to the next stage
    Pass,
    /// Discard the frame
    Drop,
}

/// Why a frame could not be parsed. Never surfaced: every variant means PASS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A header would extend past the end of the frame
    Truncated,
    /// IPv4 IHL below the 5-word minimum
    BadHeaderLength,
}

pub struct Classifier<C, S> {
    config: C,
    counters: S,
}

impl<C: PortConfig, S: CounterStore> Classifier<C, S> {
    pub const fn new(config: C, counters: S) -> Self {
        Self { config, counters }
    }

    /// Classify one frame. Always returns a verdict.
    #[inline(always)]
    pub fn classify<F: Frame + ?Sized>(&self, frame: &F) -> Verdict {
        match self.try_classify(frame) {
            Ok(verdict) => verdict,
            Err(_) => Verdict::Pass,
        }
    }

    #[inline(always)]
    pub fn try_classify<F: Frame + ?Sized>(&self, frame: &F) -> Result<Verdict, ParseError> {
        let eth: EthHdr = frame.load(0).ok_or(ParseError::Truncated)?;
        if eth.ether_type() != ETH_P_IP {
            return Ok(Verdict::Pass);
        }

        let ip: Ipv4Hdr = frame.load(EthHdr::LEN).ok_or(ParseError::Truncated)?;
        if ip.protocol != IPPROTO_TCP {
            return Ok(Verdict::Pass);
        }

        // Trust the declared length, options included. A TCP header that fits
        // after it also proves the whole IPv4 header is inside the frame.
        let ip_len = ip.header_len();
        if ip_len < Ipv4Hdr::LEN {
            return Err(ParseError::BadHeaderLength);
        }
        let tcp: TcpHdr = frame
            .load(EthHdr::LEN + ip_len)
            .ok_or(ParseError::Truncated)?;

        let drop_port = self
            .config
            .drop_port()
            .unwrap_or(DEFAULT_DROP_PORT.to_be());

        self.counters.increment(Counter::Total);

        if tcp.dest == drop_port && tcp.syn() && !tcp.ack() {
            self.counters.increment(Counter::Dropped);
            return Ok(Verdict::Drop);
        }

        Ok(Verdict::Pass)
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn counters(&self) -> &S {
        &self.counters
    }
}
