//! Whole-loop behavior on a virtual clock.
//!
//! One pass with default timings is 22 ms of virtual time: three 1 ms settles,
//! two 2 ms inter-channel pauses and the 15 ms pacing delay.

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use pedal_core::mocks::{
    CountingLed, FrontEndHandle, LedHandle, RecordingSink, ScriptedFrontEnd, SinkHandle,
};
use pedal_core::{Emission, Pedalbox, StepStatus, SystemState};
use pedal_traits::clock::test_clock::TestClock;

const GAS: u8 = 1;
const BRAKE: u8 = 4;
const CLUTCH: u8 = 5;

struct Rig {
    pb: Pedalbox,
    fe: FrontEndHandle,
    sink: SinkHandle,
    led: LedHandle,
    clock: TestClock,
}

fn rig_with(sink: RecordingSink) -> Rig {
    let fe = ScriptedFrontEnd::new();
    let led = CountingLed::new();
    let clock = TestClock::new();
    let (fe_h, sink_h, led_h) = (fe.handle(), sink.handle(), led.handle());
    let pb = Pedalbox::builder()
        .with_front_end(fe)
        .with_report_sink(sink)
        .with_status_led(led)
        .with_clock(Box::new(clock.clone()))
        .build()
        .expect("build");
    Rig {
        pb,
        fe: fe_h,
        sink: sink_h,
        led: led_h,
        clock,
    }
}

fn rig() -> Rig {
    rig_with(RecordingSink::new())
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Low travel for the first half of the window, high travel for the second.
/// Clutch never moves.
fn calibrate(r: &mut Rig) -> [bool; 3] {
    r.fe.set(GAS, 500);
    r.fe.set(BRAKE, 500);
    r.fe.set(CLUTCH, 2048);
    for _ in 0..1000 {
        if r.clock.elapsed_ms() > 5_000 {
            r.fe.set(GAS, 3500);
            r.fe.set(BRAKE, 3500);
        }
        if let StepStatus::Calibrated { calibrated, .. } = r.pb.step() {
            return calibrated;
        }
    }
    panic!("calibration never finished");
}

#[test]
fn startup_burst_precedes_first_pass() {
    let mut r = rig();
    r.pb.begin();
    assert_eq!(r.led.toggles(), 6);
    assert_eq!(r.clock.sleeps(), vec![ms(80); 6]);

    r.clock.clear_sleeps();
    assert_eq!(r.pb.step(), StepStatus::Calibrating);
    assert_eq!(
        r.clock.sleeps(),
        vec![ms(1), ms(2), ms(1), ms(2), ms(1), ms(15)]
    );
}

#[test]
fn nothing_is_reported_while_calibrating() {
    let mut r = rig();
    r.pb.begin();
    for _ in 0..400 {
        assert_eq!(r.pb.step(), StepStatus::Calibrating);
    }
    assert!(r.sink.reports().is_empty());
    assert_eq!(r.pb.outputs(), [0, 0, 0]);
}

#[test]
fn calibrating_blink_period() {
    let mut r = rig();
    r.pb.begin();
    for _ in 0..50 {
        r.pb.step();
    }
    // 6 burst toggles, then one every 5 passes (110 ms >= 100 ms)
    assert_eq!(r.led.toggles(), 16);
}

#[test]
fn full_session_learns_travel_and_reports() {
    let mut r = rig();
    r.pb.begin();
    let calibrated = calibrate(&mut r);
    assert_eq!(calibrated, [true, true, false]);
    assert_eq!(r.pb.state(), SystemState::Running);
    assert!(r.clock.elapsed_ms() > 10_000);

    let gas = r.pb.channels()[0];
    assert_eq!((gas.min, gas.max), (500, 3497));

    // pedals released: settle back to the bottom of travel
    r.fe.set(GAS, 500);
    r.fe.set(BRAKE, 500);
    for _ in 0..100 {
        r.pb.step();
    }
    assert_eq!(r.pb.outputs(), [255, 255, 0]);
    assert_eq!(r.sink.reports().last(), Some(&vec![255, 255, 0]));

    // floored: inverted wiring reads 0
    r.fe.set(GAS, 3500);
    for _ in 0..100 {
        r.pb.step();
    }
    assert_eq!(r.pb.outputs(), [0, 255, 0]);
}

#[test]
fn uncalibrated_channel_ignores_later_motion() {
    let mut r = rig();
    r.pb.begin();
    calibrate(&mut r);
    r.fe.set(CLUTCH, 4000);
    for _ in 0..200 {
        r.pb.step();
    }
    assert_eq!(r.pb.outputs()[2], 0);
    assert!(r.sink.reports().iter().all(|rep| rep[2] == 0));
}

#[test]
fn transition_pass_carries_the_burst() {
    let mut r = rig();
    r.pb.begin();
    r.fe.set(GAS, 2048);
    let mut status = StepStatus::Calibrating;
    while status == StepStatus::Calibrating {
        r.clock.clear_sleeps();
        status = r.pb.step();
    }
    let mut expected = vec![ms(1), ms(2), ms(1), ms(2), ms(1)];
    expected.extend([ms(50); 6]);
    expected.push(ms(15));
    assert_eq!(r.clock.sleeps(), expected);
    assert!(matches!(status, StepStatus::Calibrated { .. }));
}

#[test]
fn report_cadence_in_running() {
    let mut r = rig();
    r.pb.begin();
    calibrate(&mut r);

    let mut emitted_at = Vec::new();
    let mut passes_since = Vec::new();
    let mut since = 0u32;
    for _ in 0..300 {
        let before = r.clock.elapsed_ms();
        let st = r.pb.step();
        since += 1;
        if let Emission::Sent(_) = st.emission() {
            // report time is after the five acquisition sleeps
            emitted_at.push(before + 7);
            passes_since.push(since);
            since = 0;
        }
    }
    assert!(emitted_at.len() > 100);
    for w in emitted_at.windows(2) {
        assert!(w[1] - w[0] >= 33, "reports {} ms apart", w[1] - w[0]);
    }
    assert!(passes_since[1..].iter().all(|&n| (2..=3).contains(&n)));
    assert_eq!(r.pb.stats().reports_sent as usize, r.sink.reports().len());
}

#[test]
fn running_blink_period() {
    let mut r = rig();
    r.pb.begin();
    calibrate(&mut r);
    let start = r.led.toggles();
    let t0 = r.clock.elapsed_ms();
    while r.clock.elapsed_ms() - t0 < 5_000 {
        r.pb.step();
    }
    let toggles = r.led.toggles() - start;
    assert!((4..=5).contains(&toggles), "{toggles} toggles in 5 s");
}

#[test]
fn failing_transport_drops_without_backlog() {
    let mut r = rig_with(RecordingSink::failing());
    r.pb.begin();
    calibrate(&mut r);
    for _ in 0..100 {
        r.pb.step();
    }
    let stats = r.pb.stats();
    assert_eq!(stats.reports_sent, 0);
    assert!(stats.reports_dropped > 0);
    // one attempt per due slot, never a retry burst
    assert_eq!(stats.reports_dropped as usize, r.sink.reports().len());
}

#[test]
fn conversion_timeout_feeds_zero_and_counts() {
    let mut r = rig();
    r.pb.begin();
    r.fe.set(BRAKE, 2048);
    r.fe.set_timeout(BRAKE, true);
    r.pb.step();
    assert_eq!(r.pb.stats().conversion_failures, 1);
    // (2048 * 3 + 0) / 4
    assert_eq!(r.pb.channels()[1].filtered, 1536);
}

#[test]
fn run_stops_at_max_loops() {
    let mut r = rig();
    let stop = AtomicBool::new(false);
    let stats = r.pb.run(&stop, Some(25));
    assert_eq!(stats.iterations, 25);
}

#[test]
fn run_honors_shutdown_flag() {
    let mut r = rig();
    let stop = AtomicBool::new(true);
    let stats = r.pb.run(&stop, None);
    assert_eq!(stats.iterations, 0);
    // the startup burst still ran
    assert_eq!(r.led.toggles(), 6);
}
