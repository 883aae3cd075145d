use pedal_config::{load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

#[test]
fn empty_config_uses_stock_timings() {
    let cfg = load_toml("").expect("parse empty TOML");
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.calibration.window_ms, 10_000);
    assert_eq!(cfg.calibration.min_travel, 100);
    assert_eq!(cfg.report.interval_ms, 33);
    assert_eq!(cfg.pacing.pace_ms, 15);
    assert_eq!((cfg.deadzone.low, cfg.deadzone.high), (5, 250));
    assert_eq!((cfg.filter.history_weight, cfg.filter.sample_weight), (3, 1));
    assert_eq!(cfg.status.calibrating_period_ms, 100);
    assert_eq!(cfg.status.running_period_ms, 1000);
    assert_eq!(cfg.pins.adc_channels, [1, 4, 5]);
    assert_eq!(cfg.channels.inverted, [true, true, true]);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml = r#"
[report]
interval_ms = 20

[channels]
inverted = [false, true, false]

[loop]
pace_ms = 5
"#;
    let cfg = load_toml(toml).expect("parse");
    cfg.validate().expect("valid");
    assert_eq!(cfg.report.interval_ms, 20);
    assert_eq!(cfg.report.device, "/dev/hidg0");
    assert_eq!(cfg.channels.inverted, [false, true, false]);
    assert_eq!(cfg.pacing.pace_ms, 5);
    assert_eq!(cfg.acquisition.settle_ms, 1);
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_toml("[pedals]\ncount = 4\n").expect_err("unknown section");
    assert!(err.to_string().contains("pedals"));
}

#[rstest]
#[case("[filter]\nsample_weight = 0\n", "sample_weight must be >= 1")]
#[case("[filter]\nhistory_weight = 2000\n", "filter weights must sum")]
#[case("[deadzone]\nlow = 200\nhigh = 100\n", "deadzone.low")]
#[case("[deadzone]\nlow = 10\nhigh = 10\n", "deadzone.low")]
#[case("[calibration]\nmin_travel = 4095\n", "min_travel must be <")]
#[case("[report]\ninterval_ms = 0\n", "report.interval_ms must be >= 1")]
#[case("[loop]\npace_ms = 0\n", "loop.pace_ms must be >= 1")]
#[case("[status]\nrunning_period_ms = 0\n", "status periods")]
#[case("[acquisition]\nconversion_timeout_ms = 0\n", "conversion_timeout_ms")]
#[case("[pins]\nadc_channels = [1, 8, 5]\n", "out of range")]
#[case("[pins]\nadc_channels = [1, 4, 1]\n", "duplicate input 1")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "{msg:?} should contain {needle:?}");
}

#[test]
fn load_file_parses_and_validates() {
    let dir = tempdir().expect("tempdir");
    let ok = dir.path().join("ok.toml");
    fs::write(&ok, "[calibration]\nwindow_ms = 2000\n").expect("write");
    let cfg = load_file(&ok).expect("load");
    assert_eq!(cfg.calibration.window_ms, 2000);

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[loop]\npace_ms = 0\n").expect("write");
    assert!(load_file(&bad).is_err());

    let missing = dir.path().join("missing.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(err.to_string().contains("read config"));
}

#[test]
fn shipped_sample_config_is_valid_and_stock() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../etc/pedalbox.toml");
    let cfg = load_file(&path).expect("sample config loads");
    let stock = load_toml("").expect("parse empty TOML");
    assert_eq!(cfg.pins.adc_channels, stock.pins.adc_channels);
    assert_eq!(cfg.calibration.window_ms, stock.calibration.window_ms);
    assert_eq!(cfg.report.device, stock.report.device);
    assert_eq!(cfg.status.fault_blink_ms, stock.status.fault_blink_ms);
}
