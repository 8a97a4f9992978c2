use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::effect::EffectOptions;
use crate::error::Error;
use crate::surface::Size;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Root directory to scan recursively for images.
    pub photo_library_path: PathBuf,
    /// 0 disables zoom, 1 is the strongest zoom.
    pub zoom_intensity: f64,
    /// Shortest effect duration.
    #[serde(with = "humantime_serde")]
    pub min_duration: Duration,
    /// Longest effect duration.
    #[serde(with = "humantime_serde")]
    pub max_duration: Duration,
    /// Pan fully across instead of drifting around the centre.
    pub pans_across: bool,
    /// Start over from the first photo once the queue runs dry.
    pub loops: bool,
    /// Ticks per second delivered by the driver.
    pub frame_rate: u32,
    pub viewport: Viewport,
    /// Optional deterministic seed for effect parameters.
    pub seed: Option<u64>,
    /// Maximum number of concurrent image decodes in the loader.
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl From<Viewport> for Size {
    fn from(v: Viewport) -> Self {
        Size::new(v.width, v.height)
    }
}

impl Configuration {
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if it is not a valid configuration document.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        self.effect_options()
            .validate()
            .context("invalid effect settings")?;
        ensure!(self.frame_rate > 0, "frame-rate must be greater than zero");
        ensure!(
            self.viewport.width > 0.0 && self.viewport.height > 0.0,
            "viewport must have a positive width and height"
        );
        ensure!(
            self.max_in_flight > 0,
            "max-in-flight must be greater than zero"
        );
        Ok(self)
    }

    pub fn effect_options(&self) -> EffectOptions {
        EffectOptions {
            zoom_intensity: self.zoom_intensity,
            min_duration: self.min_duration,
            max_duration: self.max_duration,
            pans_across: self.pans_across,
        }
    }

    /// Interval between driver ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.frame_rate.max(1)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        let effect = EffectOptions::default();
        Self {
            photo_library_path: PathBuf::new(),
            zoom_intensity: effect.zoom_intensity,
            min_duration: effect.min_duration,
            max_duration: effect.max_duration,
            pans_across: effect.pans_across,
            loops: true,
            frame_rate: 60,
            viewport: Viewport::default(),
            seed: None,
            max_in_flight: 2,
        }
    }
}
