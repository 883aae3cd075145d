//! Channel reader call order and timing.

use std::sync::Arc;
use std::time::Duration;

use pedal_core::ChannelId;
use pedal_core::config::AcquisitionCfg;
use pedal_core::mocks::{FrontEndCall, ScriptedFrontEnd};
use pedal_core::reader::ChannelReader;
use pedal_traits::SamplingTime;
use pedal_traits::clock::test_clock::TestClock;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn reader() -> (ChannelReader<ScriptedFrontEnd>, pedal_core::mocks::FrontEndHandle, TestClock) {
    let fe = ScriptedFrontEnd::new();
    let handle = fe.handle();
    let clock = TestClock::new();
    let r = ChannelReader::new(fe, Arc::new(clock.clone()), AcquisitionCfg::default());
    (r, handle, clock)
}

#[test]
fn single_read_reconfigures_settles_then_converts() {
    let (mut r, fe, clock) = reader();
    fe.set(4, 1234);
    assert_eq!(r.read(ChannelId::Brake), 1234);
    assert_eq!(
        fe.calls(),
        vec![
            FrontEndCall::Stop,
            FrontEndCall::Configure(4, SamplingTime::Long),
            FrontEndCall::Start,
            FrontEndCall::Poll(ms(10)),
            FrontEndCall::Stop,
        ]
    );
    assert_eq!(clock.sleeps(), vec![ms(1)]);
}

#[test]
fn read_all_pauses_between_channels_only() {
    let (mut r, fe, clock) = reader();
    fe.set(1, 100);
    fe.set(4, 200);
    fe.set(5, 300);
    assert_eq!(r.read_all(), [100, 200, 300]);
    assert_eq!(clock.sleeps(), vec![ms(1), ms(2), ms(1), ms(2), ms(1)]);

    let configured: Vec<u8> = fe
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            FrontEndCall::Configure(input, _) => Some(input),
            _ => None,
        })
        .collect();
    assert_eq!(configured, vec![1, 4, 5]);
}

#[test]
fn timeout_reads_as_zero_and_is_counted() {
    let (mut r, fe, _clock) = reader();
    fe.set(1, 3000);
    fe.set_timeout(1, true);
    assert_eq!(r.read(ChannelId::Gas), 0);
    assert_eq!(r.failures(), 1);

    // the front-end is still stopped after a failed conversion
    assert_eq!(fe.calls().last(), Some(&FrontEndCall::Stop));

    fe.set_timeout(1, false);
    assert_eq!(r.read(ChannelId::Gas), 3000);
    assert_eq!(r.failures(), 1);
}

#[test]
fn values_are_masked_to_twelve_bits() {
    let (mut r, fe, _clock) = reader();
    fe.set(5, 0xF123);
    assert_eq!(r.read(ChannelId::Clutch), 0x0123);
}

#[test]
fn custom_wiring_selects_inputs() {
    let fe = ScriptedFrontEnd::new();
    let handle = fe.handle();
    let cfg = AcquisitionCfg {
        inputs: [0, 2, 7],
        ..AcquisitionCfg::default()
    };
    let mut r = ChannelReader::new(fe, Arc::new(TestClock::new()), cfg);
    handle.set(7, 42);
    assert_eq!(r.read_all(), [0, 0, 42]);
}
