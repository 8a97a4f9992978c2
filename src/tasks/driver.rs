use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, bail};
use rand::Rng;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::events::Transition;
use crate::loader::ImageLoader;
use crate::presenter::Presenter;

/// Runtime controls forwarded to the presenter between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    Pause,
    Resume,
    Skip,
}

impl FromStr for DriverCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "pause" => Ok(Self::Pause),
            "r" | "resume" => Ok(Self::Resume),
            "n" | "next" | "skip" => Ok(Self::Skip),
            other => bail!("unknown command {other:?} (expected pause, resume or next)"),
        }
    }
}

/// Display-cadence driver: ticks `presenter` every `frame_interval` until cancelled.
///
/// Late frames are skipped rather than bunched, since every tick reads the
/// clock itself. The presenter is stopped on the way out.
pub async fn run<L, R>(
    presenter: &mut Presenter<L, R>,
    frame_interval: Duration,
    mut commands: Receiver<DriverCommand>,
    cancel: CancellationToken,
) -> Result<()>
where
    L: ImageLoader,
    R: Rng,
{
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frames: u64 = 0;

    loop {
        select! {
            _ = cancel.cancelled() => {
                info!(frames, "cancel received; stopping animation");
                break;
            }

            Some(cmd) = commands.recv() => {
                let now = tokio::time::Instant::now().into_std();
                match cmd {
                    DriverCommand::Pause => presenter.pause(now),
                    DriverCommand::Resume => presenter.resume(now),
                    DriverCommand::Skip => {
                        if !presenter.skip_to_next(now) {
                            debug!("skip ignored; a cross-fade is already running");
                        }
                    }
                }
                info!(command = ?cmd, state = ?presenter.state(), "applied command");
            }

            _ = ticker.tick() => {
                // same clock as pause/resume; the interval deadline can predate a resume
                let now = tokio::time::Instant::now().into_std();
                for transition in presenter.tick(now)? {
                    match transition {
                        Transition::Swapped { faded, started } => {
                            info!(%faded, %started, "cross-fade started");
                        }
                        Transition::Retired(id) => debug!(effect = %id, "effect retired"),
                    }
                }
                frames += 1;
                let current = presenter.surface(presenter.current_surface());
                trace!(
                    frames,
                    scale = current.scale,
                    x = current.origin.0,
                    y = current.origin.1,
                    alpha = current.alpha,
                    "frame"
                );
            }
        }
    }

    presenter.stop_animating();
    Ok(())
}
