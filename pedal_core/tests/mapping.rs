//! Deadzone mapper on the documented reference points.

use pedal_core::{CalibrationCfg, DeadzoneCfg, DeadzoneMapper, PedalChannel};
use rstest::rstest;

#[rstest]
#[case::bottom_of_travel(1000, 255)]
#[case::top_of_travel(3000, 0)]
// scale 127, interior (127-5)*255/245 = 126, complement 129
#[case::midpoint_truncates(2000, 129)]
#[case::below_min_clamps(200, 255)]
#[case::above_max_clamps(4000, 0)]
fn inverted_channel_reference_points(#[case] filtered: u16, #[case] expected: u8) {
    let m = DeadzoneMapper::default();
    assert_eq!(m.map(1000, 3000, filtered, true), Some(expected));
}

#[rstest]
#[case(1000, 0)]
#[case(3000, 255)]
#[case(2000, 126)]
fn non_inverted_channel_reference_points(#[case] filtered: u16, #[case] expected: u8) {
    let m = DeadzoneMapper::default();
    assert_eq!(m.map(1000, 3000, filtered, false), Some(expected));
}

#[rstest]
#[case::lower_deadzone(4, 0)]
#[case::low_edge(5, 0)]
#[case::high_edge(250, 255)]
#[case::upper_deadzone(251, 255)]
fn deadzone_saturates(#[case] mapped: u8, #[case] expected: u8) {
    let m = DeadzoneMapper::default();
    assert_eq!(m.compress(mapped), expected);
}

#[test]
fn range_at_travel_threshold_is_unusable() {
    let m = DeadzoneMapper::default();
    assert_eq!(m.scale(1000, 1100, 1050), None);
    assert!(m.scale(1000, 1101, 1050).is_some());
}

#[test]
fn custom_deadzone_is_honored() {
    let m = DeadzoneMapper::new(&CalibrationCfg::default(), DeadzoneCfg { low: 0, high: 255 });
    for v in [0u8, 1, 127, 254, 255] {
        assert_eq!(m.compress(v), v);
    }
}

#[test]
fn apply_skips_uncalibrated_channel() {
    let m = DeadzoneMapper::default();
    let mut ch = PedalChannel::new(true);
    ch.min = 1000;
    ch.max = 3000;
    ch.filtered = 1000;
    assert!(!m.apply(&mut ch));
    assert_eq!(ch.output, 0);

    ch.calibrated = true;
    assert!(m.apply(&mut ch));
    assert_eq!(ch.output, 255);
}
