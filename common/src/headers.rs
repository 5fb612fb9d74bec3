//! Fixed-size header views.
//!
//! Multi-byte fields stay in network byte order exactly as they sit on the
//! wire. Only the fixed part of each header is described; options are
//! skipped using the length fields.

use core::mem;

use crate::{TCP_FLAG_ACK, TCP_FLAG_SYN};

/// Plain-old-data header that may be copied out of raw packet bytes.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]`, contain only integer fields (or arrays
/// of them) and accept every bit pattern.
pub unsafe trait Header: Copy {
    const LEN: usize = mem::size_of::<Self>();
}

/// Ethernet II header
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct EthHdr {
    pub h_dest: [u8; 6],
    pub h_source: [u8; 6],
    pub h_proto: u16,
}

impl EthHdr {
    /// EtherType in host byte order
    #[inline(always)]
    pub fn ether_type(&self) -> u16 {
        u16::from_be(self.h_proto)
    }
}

// SAFETY: repr(C), integer fields only
unsafe impl Header for EthHdr {}

/// IPv4 header (fixed 20-byte part, no options)
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Ipv4Hdr {
    pub version_ihl: u8,
    pub tos: u8,
    pub tot_len: u16,
    pub id: u16,
    pub frag_off: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub check: u16,
    pub saddr: u32,
    pub daddr: u32,
}

impl Ipv4Hdr {
    /// Internet Header Length in 32-bit words
    #[inline(always)]
    pub fn ihl(&self) -> u8 {
        self.version_ihl & 0x0f
    }

    /// Declared header length in bytes, options included
    #[inline(always)]
    pub fn header_len(&self) -> usize {
        self.ihl() as usize * 4
    }
}

// SAFETY: repr(C), integer fields only
unsafe impl Header for Ipv4Hdr {}

/// TCP header (fixed 20-byte part, no options)
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct TcpHdr {
    pub source: u16,
    pub dest: u16,
    pub seq: u32,
    pub ack_seq: u32,
    pub doff_flags: u16,
    pub window: u16,
    pub check: u16,
    pub urg_ptr: u16,
}

impl TcpHdr {
    /// Control flags (CWR..FIN), the low byte of the offset/flags word
    #[inline(always)]
    pub fn flags(&self) -> u8 {
        (u16::from_be(self.doff_flags) & 0xff) as u8
    }

    #[inline(always)]
    pub fn syn(&self) -> bool {
        self.flags() & TCP_FLAG_SYN != 0
    }

    #[inline(always)]
    pub fn ack(&self) -> bool {
        self.flags() & TCP_FLAG_ACK != 0
    }

    /// Destination port in host byte order
    #[inline(always)]
    pub fn dest_port(&self) -> u16 {
        u16::from_be(self.dest)
    }
}

// SAFETY: repr(C), integer fields only
unsafe impl Header for TcpHdr {}

const _: () = assert!(EthHdr::LEN == 14);
const _: () = assert!(Ipv4Hdr::LEN == 20);
const _: () = assert!(TcpHdr::LEN == 20);
