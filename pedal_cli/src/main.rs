mod cli;
mod error_fmt;
mod rt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::run::{RunOpts, build_pedalbox, make_backend, print_stats, run_pedals, stats_json};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<()> {
    let _ = color_eyre::install();

    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg.logging)?;
    if !cli.config.exists() {
        tracing::info!(path = %cli.config.display(), "config file not found; using stock settings");
    }

    match cli.cmd {
        Commands::Run {
            max_loops,
            stats,
            rt,
            rt_prio,
            rt_lock,
        } => {
            let backend = make_backend(&cfg, cli.json)?;
            tracing::info!(backend = backend.name, "backend ready");
            let pb = build_pedalbox(&cfg, backend)?;

            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = shutdown.clone();
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }

            let opts = RunOpts {
                max_loops,
                stats,
                rt,
                rt_prio,
                rt_lock,
            };
            let (loop_stats, latency) = run_pedals(&cfg, pb, &opts, shutdown)?;
            if stats {
                if cli.json {
                    println!("{}", stats_json(&loop_stats, latency.as_ref()));
                } else {
                    print_stats(&loop_stats, latency.as_ref());
                }
            }
            Ok(())
        }
        Commands::SelfCheck => {
            let backend = make_backend(&cfg, false)?;
            let name = backend.name;
            let mut pb = build_pedalbox(&cfg, backend)?;
            let [gas, brake, clutch] = pb.sample_raw();
            let failures = pb.stats().conversion_failures;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "backend": name,
                        "gas": gas,
                        "brake": brake,
                        "clutch": clutch,
                        "conversion_failures": failures,
                    })
                );
            } else {
                println!("backend={name} gas={gas} brake={brake} clutch={clutch}");
            }
            if failures > 0 {
                eyre::bail!("{failures} conversion(s) failed during self-check");
            }
            Ok(())
        }
        Commands::Descriptor { out, raw } => {
            let desc = &pedal_hardware::hidg::REPORT_DESCRIPTOR;
            let hex = desc
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" ");
            match out {
                Some(path) => {
                    let bytes = if raw {
                        desc.to_vec()
                    } else {
                        format!("{hex}\n").into_bytes()
                    };
                    std::fs::write(&path, bytes)
                        .wrap_err_with(|| format!("write descriptor {}", path.display()))?;
                    tracing::info!(path = %path.display(), len = desc.len(), raw, "descriptor written");
                }
                None => println!("{hex}"),
            }
            Ok(())
        }
    }
}

/// Missing file means stock settings; anything else must parse and validate.
fn load_config(path: &Path) -> Result<pedal_config::Config> {
    if !path.exists() {
        let cfg = pedal_config::Config::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    pedal_config::load_file(path)
}

fn init_tracing(cli: &Cli, logging: &pedal_config::Logging) -> Result<()> {
    // RUST_LOG wins, then --log-level, then the config file
    let level = cli
        .log_level
        .as_deref()
        .or(logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "pedalbox.log".into());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let writer = std::io::stderr.and(writer);
            // With a log file, console and file both get JSON lines
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(writer)
                .try_init()
                .map_err(|e| eyre::eyre!("init logging: {e}"))?;
        }
        None if cli.json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| eyre::eyre!("init logging: {e}"))?;
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init()
                .map_err(|e| eyre::eyre!("init logging: {e}"))?;
        }
    }
    Ok(())
}
