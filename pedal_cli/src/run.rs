//! Pedal loop: hardware assembly, config mapping, and loop execution.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use pedal_core::{LoopStats, Pedalbox, PipelineCfg, StepStatus};
use pedal_traits::{AnalogFrontEnd, ReportSink, StatusLed};

use crate::cli::RtLock;
use crate::rt::setup_rt_once;

/// The three injected peripherals.
pub struct Backend {
    pub front_end: Box<dyn AnalogFrontEnd>,
    pub sink: Box<dyn ReportSink>,
    pub led: Box<dyn StatusLed>,
    pub name: &'static str,
}

/// Simulated transport that prints each report as a JSON line on stdout.
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
struct JsonReportSink {
    inner: pedal_hardware::SimulatedSink,
    started: Instant,
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
impl ReportSink for JsonReportSink {
    fn send(&mut self, report: &[u8]) -> Result<(), pedal_traits::BoxError> {
        self.inner.send(report)?;
        let line = serde_json::json!({
            "t_ms": self.started.elapsed().as_millis() as u64,
            "gas": report[0],
            "brake": report[1],
            "clutch": report[2],
        });
        let mut out = std::io::stdout().lock();
        std::io::Write::write_all(&mut out, format!("{line}\n").as_bytes())?;
        Ok(())
    }
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn make_backend(_cfg: &pedal_config::Config, json: bool) -> eyre::Result<Backend> {
    let sink: Box<dyn ReportSink> = if json {
        Box::new(JsonReportSink {
            inner: pedal_hardware::SimulatedSink::new(),
            started: Instant::now(),
        })
    } else {
        Box::new(pedal_hardware::SimulatedSink::new())
    };
    Ok(Backend {
        front_end: Box::new(pedal_hardware::SimulatedFrontEnd::new()),
        sink,
        led: Box::new(pedal_hardware::SimulatedLed::new()),
        name: "sim",
    })
}

/// Bring up the MCP3208, the HID gadget and the status LED.
///
/// If the LED comes up but another peripheral does not, the process fail-stops
/// with a fast blink instead of returning.
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn make_backend(cfg: &pedal_config::Config, _json: bool) -> eyre::Result<Backend> {
    use eyre::WrapErr;
    use pedal_hardware::hidg::HidGadget;
    use pedal_hardware::{GpioLed, HardwareFrontEnd};
    use pedal_traits::MonotonicClock;

    let mut led = GpioLed::new(cfg.pins.led).wrap_err("open status led")?;

    let front_end = HardwareFrontEnd::new(cfg.pins.spi_bus, cfg.pins.spi_cs, cfg.pins.spi_clock_hz);
    let sink = HidGadget::open(&cfg.report.device);
    match (front_end, sink) {
        (Ok(front_end), Ok(sink)) => Ok(Backend {
            front_end: Box::new(front_end),
            sink: Box::new(sink),
            led: Box::new(led),
            name: "hardware",
        }),
        (fe, sink) => {
            if let Err(e) = &fe {
                tracing::error!(error = %e, "adc bring-up failed");
            }
            if let Err(e) = &sink {
                tracing::error!(error = %e, device = %cfg.report.device, "hid gadget open failed");
            }
            pedal_core::fail_stop(&mut led, &MonotonicClock::new(), cfg.status.fault_blink_ms)
        }
    }
}

pub fn build_pedalbox(cfg: &pedal_config::Config, backend: Backend) -> eyre::Result<Pedalbox> {
    // Builder/config mapping: From impls in pedal_core::conversions
    let pipeline = PipelineCfg::from(cfg);
    Pedalbox::builder()
        .with_front_end(backend.front_end)
        .with_report_sink(backend.sink)
        .with_status_led(backend.led)
        .with_pipeline(pipeline)
        .build()
}

pub struct RunOpts {
    pub max_loops: Option<u64>,
    pub stats: bool,
    pub rt: bool,
    pub rt_prio: Option<i32>,
    pub rt_lock: RtLock,
}

pub fn run_pedals(
    cfg: &pedal_config::Config,
    mut pb: Pedalbox,
    opts: &RunOpts,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<(LoopStats, Option<Latency>)> {
    setup_rt_once(opts.rt, opts.rt_prio, opts.rt_lock);

    if !opts.stats {
        return Ok((pb.run(&shutdown, opts.max_loops), None));
    }

    // Stats: wrap the loop manually to time each pass
    let mut latencies = Vec::new();
    pb.begin();
    while !shutdown.load(std::sync::atomic::Ordering::Relaxed)
        && opts.max_loops.is_none_or(|m| pb.stats().iterations < m)
    {
        let t_start = Instant::now();
        let status = pb.step();
        latencies.push(t_start.elapsed().as_micros() as u64);
        if let StepStatus::Calibrated { calibrated, .. } = status {
            tracing::info!(?calibrated, "calibration window closed");
        }
    }
    let latency = Latency::from_samples(&latencies, cfg.pacing.pace_ms);
    Ok((pb.stats(), latency))
}

/// Wall-clock duration of loop passes, in microseconds.
#[derive(Debug, Clone, Copy)]
pub struct Latency {
    pub min_us: u64,
    pub avg_us: f64,
    pub max_us: u64,
    pub stdev_us: f64,
    pub pace_ms: u64,
}

impl Latency {
    fn from_samples(latencies: &[u64], pace_ms: u64) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        let min_us = *latencies.iter().min().unwrap_or(&0);
        let max_us = *latencies.iter().max().unwrap_or(&0);
        let avg_us = latencies.iter().sum::<u64>() as f64 / latencies.len() as f64;
        let stdev_us = if latencies.len() > 1 {
            let var = latencies
                .iter()
                .map(|&x| (x as f64 - avg_us).powi(2))
                .sum::<f64>()
                / (latencies.len() as f64 - 1.0);
            var.sqrt()
        } else {
            0.0
        };
        Some(Self {
            min_us,
            avg_us,
            max_us,
            stdev_us,
            pace_ms,
        })
    }
}

/// Print loop stats to stderr.
pub fn print_stats(stats: &LoopStats, latency: Option<&Latency>) {
    eprintln!("\n--- Pedalbox Stats ---");
    eprintln!("Passes: {}", stats.iterations);
    eprintln!(
        "Reports sent/dropped: {} / {}",
        stats.reports_sent, stats.reports_dropped
    );
    eprintln!("Conversion failures: {}", stats.conversion_failures);
    eprintln!("LED failures: {}", stats.led_failures);
    if let Some(l) = latency {
        eprintln!("Pace (ms): {}", l.pace_ms);
        eprintln!(
            "Pass min/avg/max/stdev (us): {} / {:.1} / {} / {:.1}",
            l.min_us, l.avg_us, l.max_us, l.stdev_us
        );
    }
    eprintln!("----------------------\n");
}

pub fn stats_json(stats: &LoopStats, latency: Option<&Latency>) -> serde_json::Value {
    let mut v = serde_json::json!({
        "iterations": stats.iterations,
        "reports_sent": stats.reports_sent,
        "reports_dropped": stats.reports_dropped,
        "conversion_failures": stats.conversion_failures,
        "led_failures": stats.led_failures,
    });
    if let Some(l) = latency {
        v["latency_us"] = serde_json::json!({
            "min": l.min_us,
            "avg": l.avg_us,
            "max": l.max_us,
            "stdev": l.stdev_us,
        });
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_summary() {
        let l = Latency::from_samples(&[10, 20, 30], 15).unwrap();
        assert_eq!((l.min_us, l.max_us), (10, 30));
        assert!((l.avg_us - 20.0).abs() < 1e-9);
        assert!((l.stdev_us - 10.0).abs() < 1e-9);
        assert!(Latency::from_samples(&[], 15).is_none());
    }

    #[test]
    fn stats_json_shape() {
        let stats = LoopStats {
            iterations: 5,
            reports_sent: 2,
            ..LoopStats::default()
        };
        let v = stats_json(&stats, None);
        assert_eq!(v["iterations"], 5);
        assert_eq!(v["reports_sent"], 2);
        assert!(v.get("latency_us").is_none());
    }
}
