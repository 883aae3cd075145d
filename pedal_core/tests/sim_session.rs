//! Session against the simulated hardware backend on a virtual clock.

use pedal_core::{PipelineCfg, StepStatus, SystemState, build_pedalbox};
use pedal_hardware::{SimulatedFrontEnd, SimulatedLed, SimulatedSink};
use pedal_traits::clock::test_clock::TestClock;

#[test]
fn simulated_pedals_calibrate_and_stream() {
    let clock = TestClock::new();
    let mut pb = build_pedalbox(
        SimulatedFrontEnd::new().with_timeout_every(7),
        SimulatedSink::new(),
        SimulatedLed::new(),
        PipelineCfg::default(),
        Some(Box::new(clock.clone())),
    )
    .expect("build");

    pb.begin();
    let mut flags = None;
    for _ in 0..1000 {
        if let StepStatus::Calibrated { calibrated, .. } = pb.step() {
            flags = Some(calibrated);
            break;
        }
    }
    assert_eq!(flags, Some([true; 3]));
    assert_eq!(pb.state(), SystemState::Running);

    for _ in 0..90 {
        pb.step();
    }
    let stats = pb.stats();
    assert!(stats.conversion_failures > 0);
    assert_eq!(stats.reports_dropped, 0);
    assert_eq!(pb.sink().sent(), stats.reports_sent);
    assert!(pb.sink().last().is_some());
    assert!(pb.led().toggles() > 6);
    assert!(pb.front_end().conversions() >= 3 * stats.iterations);
}
