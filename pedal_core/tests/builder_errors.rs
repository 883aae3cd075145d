use pedal_core::error::BuildError;
use pedal_core::mocks::{CountingLed, RecordingSink, ScriptedFrontEnd};
use pedal_core::{DeadzoneCfg, FilterCfg, LoopCfg, Pedalbox, PipelineCfg, ReportCfg, build_pedalbox};
use rstest::rstest;

#[rstest]
fn builder_missing_front_end_yields_typed_build_error() {
    let err = Pedalbox::builder()
        // missing with_front_end()
        .with_report_sink(RecordingSink::new())
        .with_status_led(CountingLed::new())
        .try_build()
        .expect_err("should fail with MissingFrontEnd");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingFrontEnd) => {}
        other => panic!("expected MissingFrontEnd, got: {other:?}"),
    }
}

#[rstest]
fn builder_missing_sink_yields_typed_build_error() {
    let err = Pedalbox::builder()
        .with_front_end(ScriptedFrontEnd::new())
        .with_status_led(CountingLed::new())
        .try_build()
        .expect_err("should fail with MissingReportSink");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingReportSink)
    ));
}

#[rstest]
fn builder_missing_led_yields_typed_build_error() {
    let err = Pedalbox::builder()
        .with_front_end(ScriptedFrontEnd::new())
        .with_report_sink(RecordingSink::new())
        .try_build()
        .expect_err("should fail with MissingStatusLed");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::MissingStatusLed)
    ));
}

#[rstest]
#[case::zero_sample_weight(PipelineCfg { filter: FilterCfg { history_weight: 3, sample_weight: 0 }, ..Default::default() })]
#[case::inverted_deadzone(PipelineCfg { deadzone: DeadzoneCfg { low: 200, high: 100 }, ..Default::default() })]
#[case::zero_interval(PipelineCfg { report: ReportCfg { interval_ms: 0 }, ..Default::default() })]
#[case::zero_pace(PipelineCfg { pacing: LoopCfg { pace_ms: 0 }, ..Default::default() })]
fn invalid_pipeline_is_rejected(#[case] cfg: PipelineCfg) {
    let err = build_pedalbox(
        ScriptedFrontEnd::new(),
        RecordingSink::new(),
        CountingLed::new(),
        cfg,
        None,
    )
    .expect_err("should be rejected");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
fn complete_builder_builds_in_calibrating_state() {
    let pb = Pedalbox::builder()
        .with_front_end(ScriptedFrontEnd::new())
        .with_report_sink(RecordingSink::new())
        .with_status_led(CountingLed::new())
        .build()
        .expect("build");
    assert_eq!(pb.state(), pedal_core::SystemState::Calibrating);
    assert_eq!(pb.outputs(), [0, 0, 0]);
}
