//! Timing and geometry model for one pan/zoom/fade animation.
//!
//! Everything an effect reports is a pure function of `now - start`; the only
//! mutable timing state is the start instant (moved by pause/resume) and the
//! duration (shortened by a forced fade).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::Error;
use crate::random::RandomSource;
use crate::surface::{Size, Surface, SurfaceId};

/// Length of the cross-fade at the end of every effect.
pub const FADE_OUT: Duration = Duration::from_secs(2);

/// Knobs shared by every effect a controller creates.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOptions {
    /// 0 disables zoom, 1 is the strongest zoom.
    pub zoom_intensity: f64,
    pub min_duration: Duration,
    pub max_duration: Duration,
    /// Pan fully across horizontally instead of drifting around the centre.
    pub pans_across: bool,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self {
            zoom_intensity: 1.0,
            min_duration: Duration::from_secs(12),
            max_duration: Duration::from_secs(24),
            pans_across: false,
        }
    }
}

impl EffectOptions {
    /// # Errors
    /// Returns [`Error::InvalidZoomIntensity`] or [`Error::InvalidRange`] for out-of-range knobs.
    pub fn validate(&self) -> Result<(), Error> {
        validate_zoom_intensity(self.zoom_intensity)?;
        validate_duration_range(self.min_duration, self.max_duration)
    }
}

pub(crate) fn validate_zoom_intensity(z: f64) -> Result<(), Error> {
    if !(0.0..=1.0).contains(&z) {
        return Err(Error::InvalidZoomIntensity(z));
    }
    Ok(())
}

pub(crate) fn validate_duration_range(min: Duration, max: Duration) -> Result<(), Error> {
    // durations are drawn as f64 seconds and must convert back
    let representable = Duration::try_from_secs_f64(max.as_secs_f64()).is_ok();
    if min.is_zero() || max < min || !representable {
        return Err(Error::InvalidRange {
            min: min.as_secs_f64(),
            max: max.as_secs_f64(),
        });
    }
    Ok(())
}

/// Parameters drawn once when an effect is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub duration: Duration,
}

impl EffectParams {
    /// Draw zoom, pan offsets and duration for `options`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if the duration range is inverted or too
    /// large to represent.
    pub fn draw<R: Rng>(
        options: &EffectOptions,
        rng: &mut RandomSource<R>,
    ) -> Result<Self, Error> {
        let z = options.zoom_intensity;
        let zoom = rng.uniform_f64(1.0 + 0.3 * z, 1.0 + 1.4 * z)?;
        let extreme = 1.0 - zoom;
        let (offset_x, offset_y) = if options.pans_across {
            (extreme, rng.uniform_f64(0.7 * extreme, 0.3 * extreme)?)
        } else {
            (
                rng.uniform_f64(extreme, 0.0)?,
                rng.uniform_f64(extreme, 0.0)?,
            )
        };
        let (min, max) = (
            options.min_duration.as_secs_f64(),
            options.max_duration.as_secs_f64(),
        );
        let secs = rng.uniform_f64(min, max)?;
        let duration =
            Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidRange { min, max })?;
        Ok(Self {
            zoom,
            offset_x,
            offset_y,
            duration,
        })
    }
}

/// Process-unique identity of an effect, used for removal from the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

impl EffectId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A callback slot that runs its handler at most once.
pub enum OneShot<F> {
    Empty,
    Pending(F),
    Fired,
}

impl<F> OneShot<F> {
    /// Take the handler out and mark the slot fired. Empty slots stay empty.
    fn take(&mut self) -> Option<F> {
        match std::mem::replace(self, Self::Fired) {
            Self::Pending(handler) => Some(handler),
            Self::Empty => {
                *self = Self::Empty;
                None
            }
            Self::Fired => None,
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(self, Self::Fired)
    }
}

impl<F> std::fmt::Debug for OneShot<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Empty => "Empty",
            Self::Pending(_) => "Pending",
            Self::Fired => "Fired",
        })
    }
}

pub type EffectCallback = Box<dyn FnOnce(EffectId)>;

/// Geometry and opacity for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub scale: f64,
    pub origin: (f64, f64),
    pub alpha: f64,
}

impl Frame {
    pub fn apply_to<I>(&self, surface: &mut Surface<I>) {
        surface.scale = self.scale;
        surface.origin = self.origin;
        surface.alpha = self.alpha;
    }
}

#[derive(Debug)]
pub struct KenBurnsEffect {
    id: EffectId,
    surface: SurfaceId,
    params: EffectParams,
    start: Instant,
    on_will_fade_out: OneShot<EffectCallback>,
    on_finished: OneShot<EffectCallback>,
}

impl KenBurnsEffect {
    /// Start a new effect on `surface` at `now` with freshly drawn parameters.
    ///
    /// # Errors
    /// Propagates [`Error::InvalidRange`] from parameter drawing.
    pub fn new<R: Rng>(
        surface: SurfaceId,
        options: &EffectOptions,
        rng: &mut RandomSource<R>,
        now: Instant,
    ) -> Result<Self, Error> {
        Ok(Self::with_params(
            surface,
            EffectParams::draw(options, rng)?,
            now,
        ))
    }

    pub fn with_params(surface: SurfaceId, params: EffectParams, now: Instant) -> Self {
        Self {
            id: EffectId::next(),
            surface,
            params,
            start: now,
            on_will_fade_out: OneShot::Empty,
            on_finished: OneShot::Empty,
        }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn params(&self) -> &EffectParams {
        &self.params
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn on_will_fade_out(&mut self, handler: impl FnOnce(EffectId) + 'static) {
        self.on_will_fade_out = OneShot::Pending(Box::new(handler));
    }

    pub fn on_finished(&mut self, handler: impl FnOnce(EffectId) + 'static) {
        self.on_finished = OneShot::Pending(Box::new(handler));
    }

    /// Fraction of the duration elapsed at `now`; 0 before start, may exceed 1.
    pub fn progress(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.start).as_secs_f64() / self.params.duration.as_secs_f64()
    }

    /// Seconds left at `now`; negative once the effect has run past its end.
    pub fn time_remaining(&self, now: Instant) -> f64 {
        (1.0 - self.progress(now)) * self.params.duration.as_secs_f64()
    }

    pub fn frame(&self, now: Instant, bounds: Size) -> Frame {
        let curved = ease_out(self.progress(now));
        let remaining = self.time_remaining(now);
        let fade = FADE_OUT.as_secs_f64();
        let alpha = if remaining > fade {
            1.0
        } else {
            (remaining / fade).clamp(0.0, 1.0)
        };
        Frame {
            scale: 1.0 + curved * (self.params.zoom - 1.0),
            origin: (
                bounds.width * curved * self.params.offset_x,
                bounds.height * curved * self.params.offset_y,
            ),
            alpha,
        }
    }

    /// Advance to `now`: write the frame into `surface`, then fire any thresholds crossed.
    pub fn update<I>(&mut self, now: Instant, surface: &mut Surface<I>) -> Frame {
        let frame = self.frame(now, surface.size);
        frame.apply_to(surface);

        let remaining = self.time_remaining(now);
        if remaining <= FADE_OUT.as_secs_f64() {
            if let Some(handler) = self.on_will_fade_out.take() {
                handler(self.id);
            }
        }
        if remaining <= 0.0 {
            if let Some(handler) = self.on_finished.take() {
                handler(self.id);
            }
        }
        frame
    }

    /// Shorten the effect so its fade-out starts at `now`.
    pub fn fade_out_now(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.start);
        self.params.duration = elapsed + FADE_OUT;
    }

    /// Move the time origin forward, e.g. by the length of a pause.
    pub fn shift_start(&mut self, by: Duration) {
        self.start += by;
    }

    pub fn will_fade_out_fired(&self) -> bool {
        self.on_will_fade_out.is_fired()
    }

    pub fn finished_fired(&self) -> bool {
        self.on_finished.is_fired()
    }
}

/// CSS `ease-out`: cubic bezier through (0,0), (0,0), (0.58,1), (1,1).
///
/// Input is clamped to `[0, 1]`.
pub fn ease_out(t: f64) -> f64 {
    const X1: f64 = 0.0;
    const Y1: f64 = 0.0;
    const X2: f64 = 0.58;
    const Y2: f64 = 1.0;

    if t.is_nan() || t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    fn sample(a1: f64, a2: f64, u: f64) -> f64 {
        let omu = 1.0 - u;
        3.0 * omu * omu * u * a1 + 3.0 * omu * u * u * a2 + u * u * u
    }

    // bx is monotone on [0,1] so bisection always converges.
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..48 {
        let mid = 0.5 * (lo + hi);
        if sample(X1, X2, mid) < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    sample(Y1, Y2, 0.5 * (lo + hi)).clamp(0.0, 1.0)
}
