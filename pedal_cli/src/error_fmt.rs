//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use pedal_core::error::BuildError;
    use pedal_hardware::error::HwError;

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingFrontEnd => {
                "What happened: No analog front-end was provided to the pedal pipeline.\nLikely causes: The ADC failed to initialize or was not wired into the builder.\nHow to fix: Ensure the front-end is created successfully and passed via with_front_end(...).".to_string()
            }
            BuildError::MissingReportSink => {
                "What happened: No report transport was provided.\nLikely causes: The HID gadget device could not be opened.\nHow to fix: Ensure the gadget is configured and passed via with_report_sink(...).".to_string()
            }
            BuildError::MissingStatusLed => {
                "What happened: No status LED was provided.\nLikely causes: GPIO setup failed or was not wired into the builder.\nHow to fix: Pass the LED via with_status_led(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::Gpio(_) => format!(
                "What happened: {hw}.\nLikely causes: Wrong [pins] led number or no permission to access GPIO.\nHow to fix: Fix pins.led in the config; run as a user in the gpio group."
            ),
            HwError::Spi(_) => format!(
                "What happened: {hw}.\nLikely causes: SPI disabled, wrong bus/chip-select, or ADC not powered.\nHow to fix: Enable SPI (dtparam=spi=on), check pins.spi_bus / pins.spi_cs and the ADC wiring."
            ),
            HwError::Io(_) => format!(
                "What happened: {hw}.\nLikely causes: The HID gadget device does not exist or is not writable.\nHow to fix: Create the gadget through configfs and check report.device in the config."
            ),
            HwError::Timeout | HwError::ConversionNotStarted => format!(
                "What happened: {hw}.\nLikely causes: ADC not responding.\nHow to fix: Check ADC power and wiring."
            ),
        };
    }

    // String-based heuristics for errors coming from config loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("parse config") {
        return format!(
            "What happened: The config file is not valid TOML for this program.\nLikely causes: A typo in a key or section name, or a value of the wrong type.\nHow to fix: Compare with etc/pedalbox.toml. Original: {msg}"
        );
    }

    if lower.starts_with("read config") {
        return format!(
            "What happened: The config file could not be read.\nHow to fix: Check the --config path and file permissions. Original: {msg}"
        );
    }

    if lower.contains("must be") || lower.contains("out of range") || lower.contains("duplicate") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name for the error class, used as `reason` in JSON output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    use pedal_core::error::BuildError;
    use pedal_hardware::error::HwError;

    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Hardware";
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.contains("config") || lower.contains("must be") {
        "Config"
    } else {
        "Error"
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
