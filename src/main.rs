//! Binary entrypoint: a headless Ken Burns slideshow over a photo directory.
//!
//! Frames are not rendered; surface geometry is logged at trace level so the
//! scheduling core can be watched end to end.

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, info, warn};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, fmt};

use ken_burns::config::Configuration;
use ken_burns::presenter::Presenter;
use ken_burns::random::RandomSource;
use ken_burns::scan::{ScanOptions, scan_with_options};
use ken_burns::tasks::driver::{self, DriverCommand};
use ken_burns::tasks::loader::DecodingLoader;

#[derive(Debug, Parser)]
#[command(name = "ken-burns", version, about = "Headless Ken Burns slideshow")]
struct Cli {
    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE", default_value = "config.yaml")]
    config: PathBuf,

    /// Stop after this long (e.g. "90s", "5m")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    run_for: Option<Duration>,

    /// Deterministic seed for effect parameters (overrides the config)
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("ken_burns={level}").parse::<Directive>()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = Configuration::from_yaml_file(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?
        .validated()
        .context("invalid configuration values")?;

    let photos = scan_with_options(
        std::slice::from_ref(&cfg.photo_library_path),
        &ScanOptions::default(),
    )?;
    info!(count = photos.len(), "scanned images");

    let cancel = CancellationToken::new();
    let loader = DecodingLoader::new(Handle::current(), cfg.max_in_flight, cancel.clone());
    let rng = match cli.seed.or(cfg.seed) {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_os_rng(),
    };
    let mut presenter = Presenter::with_rng(loader, cfg.viewport.into(), rng);
    presenter.set_options(cfg.effect_options())?;
    presenter.set_loops(cfg.loops);
    presenter
        .assign_locators(
            photos
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            None,
        )
        .with_context(|| format!("no images in {}", cfg.photo_library_path.display()))?;
    presenter.start_animating(Instant::now())?;

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("ctrl-c received; initiating shutdown");
                    cancel.cancel();
                }
                Err(err) => warn!("ctrl-c handler unavailable: {err}"),
            }
        });
    }
    if let Some(limit) = cli.run_for {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            info!(after = %humantime::format_duration(limit), "run-for elapsed");
            cancel.cancel();
        });
    }

    let (cmd_tx, cmd_rx) = mpsc::channel::<DriverCommand>(8);
    if io::stdin().is_terminal() {
        // Plain thread: a blocked stdin read must not hold up runtime shutdown.
        std::thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match line.parse::<DriverCommand>() {
                    Ok(cmd) => {
                        if cmd_tx.blocking_send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!("{err}"),
                }
            }
        });
    }

    driver::run(&mut presenter, cfg.frame_interval(), cmd_rx, cancel).await
}
