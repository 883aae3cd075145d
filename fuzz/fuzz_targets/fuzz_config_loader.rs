#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validate must reject bad input gracefully, never panic.
    let Ok(cfg) = toml::from_str::<pedal_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }

    // Anything validate() accepts must run through the filter and mapper
    // without overflow for every raw extreme.
    let pipeline = pedal_core::PipelineCfg::from(&cfg);
    let mapper = pedal_core::DeadzoneMapper::new(&pipeline.calibration, pipeline.deadzone);
    for raw in [0u16, 1, 2048, 4094, 4095] {
        let f = pedal_core::smooth(&pipeline.filter, 4095, raw);
        assert!(f <= 4095);
        let _ = mapper.map(0, 4095, f, true);
        let _ = mapper.map(f, 4095, raw, false);
    }
});
