// Classifier tests against in-memory stores
// Mirror what the XDP program does with its CONFIG / PKT_COUNT maps

use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use syngate::classifier::memory::{AtomicPort, SharedCounters, StaticPort};
use syngate::classifier::{
    Classifier, Verdict, DEFAULT_DROP_PORT, ETH_P_IP, IPPROTO_TCP, TCP_FLAG_ACK, TCP_FLAG_SYN,
};

const ETH_P_IPV6: u16 = 0x86DD;
const IPPROTO_UDP: u8 = 17;
const TCP_FLAG_FIN: u8 = 0x01;
const TCP_FLAG_RST: u8 = 0x04;

/// Ethernet + IPv4 (20 bytes) + TCP (20 bytes) frame
fn tcp_frame(dest_port: u16, flags: u8) -> Vec<u8> {
    let mut frame = vec![0u8; 54];
    frame[0..6].copy_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
    frame[6..12].copy_from_slice(&[0x02, 0, 0, 0, 0, 0x02]);
    frame[12..14].copy_from_slice(&ETH_P_IP.to_be_bytes());

    // IPv4: version 4, IHL 5, total length 40, TTL 64, 10.0.0.2 -> 10.0.0.1
    frame[14] = 0x45;
    frame[16..18].copy_from_slice(&40u16.to_be_bytes());
    frame[22] = 64;
    frame[23] = IPPROTO_TCP;
    frame[26..30].copy_from_slice(&[10, 0, 0, 2]);
    frame[30..34].copy_from_slice(&[10, 0, 0, 1]);

    frame[34..36].copy_from_slice(&51000u16.to_be_bytes());
    frame[36..38].copy_from_slice(&dest_port.to_be_bytes());
    frame[46] = 0x50;
    frame[47] = flags;
    frame
}

fn classifier(port: u16) -> Classifier<StaticPort, SharedCounters> {
    Classifier::new(StaticPort::new(port), SharedCounters::new())
}

#[test]
fn scenario_syn_to_drop_port_is_dropped() {
    let c = classifier(8080);

    assert_eq!(c.classify(&tcp_frame(8080, TCP_FLAG_SYN)[..]), Verdict::Drop);
    assert_eq!(c.counters().dropped(), 1);
    assert_eq!(c.counters().total(), 1);
}

#[test]
fn scenario_syn_ack_passes() {
    let c = classifier(8080);

    let verdict = c.classify(&tcp_frame(8080, TCP_FLAG_SYN | TCP_FLAG_ACK)[..]);
    assert_eq!(verdict, Verdict::Pass);
    assert_eq!(c.counters().dropped(), 0);
    assert_eq!(c.counters().total(), 1);
}

#[test]
fn scenario_non_ipv4_not_counted() {
    let c = classifier(8080);
    let mut frame = tcp_frame(8080, TCP_FLAG_SYN);
    frame[12..14].copy_from_slice(&ETH_P_IPV6.to_be_bytes());

    assert_eq!(c.classify(&frame[..]), Verdict::Pass);
    assert_eq!(c.counters().total(), 0);
    assert_eq!(c.counters().dropped(), 0);
}

#[test]
fn scenario_udp_not_counted() {
    let c = classifier(8080);
    let mut frame = tcp_frame(8080, TCP_FLAG_SYN);
    frame[23] = IPPROTO_UDP;

    assert_eq!(c.classify(&frame[..]), Verdict::Pass);
    assert_eq!(c.counters().total(), 0);
    assert_eq!(c.counters().dropped(), 0);
}

#[test]
fn scenario_truncated_network_header() {
    let c = classifier(8080);
    let frame = tcp_frame(8080, TCP_FLAG_SYN);

    assert_eq!(c.classify(&frame[..14 + 12]), Verdict::Pass);
    assert_eq!(c.counters().total(), 0);
    assert_eq!(c.counters().dropped(), 0);
}

#[test]
fn truncated_transport_header_not_counted() {
    let c = classifier(8080);
    let frame = tcp_frame(8080, TCP_FLAG_SYN);

    assert_eq!(c.classify(&frame[..53]), Verdict::Pass);
    assert_eq!(c.counters().total(), 0);
}

#[test]
fn default_port_when_unconfigured() {
    let c = Classifier::new(StaticPort::unset(), SharedCounters::new());

    assert_eq!(
        c.classify(&tcp_frame(DEFAULT_DROP_PORT, TCP_FLAG_SYN)[..]),
        Verdict::Drop
    );
    assert_eq!(c.classify(&tcp_frame(8080, TCP_FLAG_SYN)[..]), Verdict::Pass);
}

#[test]
fn other_flag_combinations_pass() {
    let c = classifier(8080);

    for flags in [0, TCP_FLAG_ACK, TCP_FLAG_FIN, TCP_FLAG_RST, TCP_FLAG_FIN | TCP_FLAG_ACK] {
        assert_eq!(c.classify(&tcp_frame(8080, flags)[..]), Verdict::Pass);
    }
    // SYN with extra non-ACK flags still opens a connection
    assert_eq!(
        c.classify(&tcp_frame(8080, TCP_FLAG_SYN | TCP_FLAG_FIN)[..]),
        Verdict::Drop
    );
    assert_eq!(c.counters().total(), 6);
    assert_eq!(c.counters().dropped(), 1);
}

#[test]
fn retargeting_takes_effect_on_next_frame() {
    let c = Classifier::new(AtomicPort::unset(), SharedCounters::new());
    let syn_8080 = tcp_frame(8080, TCP_FLAG_SYN);

    assert_eq!(c.classify(&syn_8080[..]), Verdict::Pass);
    c.config().set(8080);
    assert_eq!(c.classify(&syn_8080[..]), Verdict::Drop);
    c.config().clear();
    assert_eq!(
        c.classify(&tcp_frame(DEFAULT_DROP_PORT, TCP_FLAG_SYN)[..]),
        Verdict::Drop
    );
}

#[test]
fn concurrent_invocations_do_not_lose_counts() {
    let c = Arc::new(classifier(8080));
    let syn = Arc::new(tcp_frame(8080, TCP_FLAG_SYN));
    let ack = Arc::new(tcp_frame(8080, TCP_FLAG_ACK));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let c = Arc::clone(&c);
            let syn = Arc::clone(&syn);
            let ack = Arc::clone(&ack);
            thread::spawn(move || {
                for _ in 0..1000 {
                    c.classify(&syn[..]);
                    c.classify(&ack[..]);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(c.counters().total(), 8000);
    assert_eq!(c.counters().dropped(), 4000);
}

proptest! {
    #[test]
    fn prop_short_frames_pass_uncounted(bytes in proptest::collection::vec(any::<u8>(), 0..14)) {
        let c = classifier(8080);
        prop_assert_eq!(c.classify(&bytes[..]), Verdict::Pass);
        prop_assert_eq!(c.counters().total(), 0);
        prop_assert_eq!(c.counters().dropped(), 0);
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let c = classifier(8080);
        let verdict = c.classify(&bytes[..]);
        prop_assert!(c.counters().total() <= 1);
        prop_assert_eq!(
            c.counters().dropped(),
            if verdict == Verdict::Drop { 1 } else { 0 }
        );
    }

    #[test]
    fn prop_well_formed_tcp_counted_once(port in 1u16.., dest in 1u16.., flags in any::<u8>()) {
        let c = classifier(port);
        let verdict = c.classify(&tcp_frame(dest, flags)[..]);

        let is_connect = flags & TCP_FLAG_SYN != 0 && flags & TCP_FLAG_ACK == 0;
        let expected = if dest == port && is_connect { Verdict::Drop } else { Verdict::Pass };

        prop_assert_eq!(verdict, expected);
        prop_assert_eq!(c.counters().total(), 1);
        prop_assert_eq!(c.counters().dropped(), u64::from(expected == Verdict::Drop));
    }

    #[test]
    fn prop_same_frame_same_verdict(dest in 1u16.., flags in any::<u8>()) {
        let c = classifier(8080);
        let frame = tcp_frame(dest, flags);

        let first = c.classify(&frame[..]);
        let second = c.classify(&frame[..]);
        prop_assert_eq!(first, second);
        prop_assert_eq!(c.counters().total(), 2);
    }
}
