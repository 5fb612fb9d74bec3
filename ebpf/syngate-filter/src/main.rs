#![no_std]
#![no_main]

use aya_ebpf::{
    bindings::xdp_action,
    macros::{map, xdp},
    maps::Array,
    programs::XdpContext,
};
use aya_log_ebpf::debug;

use core::ptr;
use core::sync::atomic::{AtomicU64, Ordering};

use syngate_common::{
    Classifier, Counter, CounterStore, Frame, Header, PortConfig, Verdict, CONFIG_DROP_PORT,
    CONFIG_SLOTS, COUNTER_SLOTS,
};

// Drop port in network byte order, written by userspace (0 = unset)
#[map]
static CONFIG: Array<u16> = Array::with_max_entries(CONFIG_SLOTS, 0);

// total / dropped
#[map]
static PKT_COUNT: Array<u64> = Array::with_max_entries(COUNTER_SLOTS, 0);

#[xdp]
pub fn syngate_filter(ctx: XdpContext) -> u32 {
    let classifier = Classifier::new(ConfigMap, CounterMap);

    match classifier.classify(&XdpFrame(&ctx)) {
        Verdict::Pass => xdp_action::XDP_PASS,
        Verdict::Drop => {
            debug!(&ctx, "dropped connection attempt");
            xdp_action::XDP_DROP
        }
    }
}

/// Packet bytes between `data` and `data_end`
struct XdpFrame<'a>(&'a XdpContext);

impl Frame for XdpFrame<'_> {
    #[inline(always)]
    fn load<H: Header>(&self, offset: usize) -> Option<H> {
        let start = self.0.data();
        let end = self.0.data_end();

        // Checked against data_end before the read, or the verifier rejects us
        if start + offset + H::LEN > end {
            return None;
        }

        Some(unsafe { ptr::read_unaligned((start + offset) as *const H) })
    }
}

struct ConfigMap;

impl PortConfig for ConfigMap {
    #[inline(always)]
    fn drop_port(&self) -> Option<u16> {
        match CONFIG.get(CONFIG_DROP_PORT) {
            Some(&port) if port != 0 => Some(port),
            _ => None,
        }
    }
}

struct CounterMap;

impl CounterStore for CounterMap {
    #[inline(always)]
    fn increment(&self, counter: Counter) {
        if let Some(slot) = PKT_COUNT.get_ptr_mut(counter.index()) {
            // Array slots are shared by every CPU
            unsafe {
                AtomicU64::from_ptr(slot).fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

#[link_section = "license"]
#[no_mangle]
static LICENSE: [u8; 13] = *b"Dual MIT/GPL\0";

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
