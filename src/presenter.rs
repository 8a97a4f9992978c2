//! Double-buffered presentation controller.
//!
//! Owns the two surfaces, the active effect set and the prefetch queue. The
//! host pumps [`Presenter::tick`] once per display refresh; every effect is
//! advanced first, then the swap/queue transitions reported during that pass
//! are applied in order.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::buffer::RingBuffer;
use crate::effect::{
    EffectId, EffectOptions, KenBurnsEffect, validate_duration_range, validate_zoom_intensity,
};
use crate::error::Error;
use crate::events::{Content, EffectEvent, LoadResult, Transition};
use crate::loader::{ImageLoader, LoadCompletion};
use crate::random::RandomSource;
use crate::surface::{Size, Surface, SurfaceId, SurfacePair};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Animating,
    Paused { since: Instant },
}

/// The assigned list plus the ring that is drained from it.
struct ContentQueue<I> {
    source: Vec<Content<I>>,
    pending: RingBuffer<Content<I>>,
}

impl<I: Clone> ContentQueue<I> {
    fn new(items: Vec<Content<I>>) -> Result<Self, Error> {
        let pending = RingBuffer::from_vec(items.clone())?;
        Ok(Self {
            source: items,
            pending,
        })
    }

    fn next_item(&mut self, loops: bool) -> Option<Content<I>> {
        if let Some(item) = self.pending.read() {
            return Some(item);
        }
        if !loops {
            return None;
        }
        for item in &self.source {
            if !self.pending.write(item.clone()) {
                break;
            }
        }
        self.pending.read()
    }
}

pub struct Presenter<L: ImageLoader, R = StdRng> {
    loader: L,
    rng: RandomSource<R>,
    options: EffectOptions,
    loops: bool,
    bounds: Size,
    surfaces: SurfacePair<L::Image>,
    effects: Vec<KenBurnsEffect>,
    state: PlaybackState,
    ticking: bool,
    resumed_at: Option<Instant>,
    queue: Option<ContentQueue<L::Image>>,
    events_tx: Sender<EffectEvent>,
    events_rx: Receiver<EffectEvent>,
    loads_tx: Sender<LoadResult<L::Image>>,
    loads_rx: Receiver<LoadResult<L::Image>>,
}

impl<L: ImageLoader> Presenter<L> {
    pub fn new(loader: L, bounds: Size) -> Self {
        Self::with_rng(loader, bounds, RandomSource::from_os_rng())
    }
}

impl<L: ImageLoader, R: Rng> Presenter<L, R> {
    pub fn with_rng(loader: L, bounds: Size, rng: RandomSource<R>) -> Self {
        let (events_tx, events_rx) = unbounded();
        let (loads_tx, loads_rx) = unbounded();
        Self {
            loader,
            rng,
            options: EffectOptions::default(),
            loops: true,
            bounds,
            surfaces: SurfacePair::new(bounds),
            effects: Vec::new(),
            state: PlaybackState::Idle,
            ticking: false,
            resumed_at: None,
            queue: None,
            events_tx,
            events_rx,
            loads_tx,
            loads_rx,
        }
    }

    /// # Errors
    /// Returns [`Error::InvalidZoomIntensity`] unless `z` is within `[0, 1]`.
    pub fn set_zoom_intensity(&mut self, z: f64) -> Result<(), Error> {
        validate_zoom_intensity(z)?;
        self.options.zoom_intensity = z;
        Ok(())
    }

    /// Range new effects draw their duration from. Running effects keep theirs.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] if `min` is zero or `max < min`.
    pub fn set_duration_range(&mut self, min: Duration, max: Duration) -> Result<(), Error> {
        validate_duration_range(min, max)?;
        self.options.min_duration = min;
        self.options.max_duration = max;
        Ok(())
    }

    pub fn set_pans_across(&mut self, pans_across: bool) {
        self.options.pans_across = pans_across;
    }

    /// # Errors
    /// Rejects the whole set if any knob is out of range; nothing is applied then.
    pub fn set_options(&mut self, options: EffectOptions) -> Result<(), Error> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    pub fn options(&self) -> &EffectOptions {
        &self.options
    }

    /// Whether an exhausted queue starts over from its first item.
    pub fn set_loops(&mut self, loops: bool) {
        self.loops = loops;
    }

    pub fn loops(&self) -> bool {
        self.loops
    }

    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
        for surface in self.surfaces.iter_mut() {
            surface.size = bounds;
        }
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Replace the content queue. `current` gets the first item, `next` the second.
    ///
    /// # Errors
    /// Returns [`Error::EmptyQueue`] if `items` is empty; playback is untouched then.
    pub fn assign_queue(&mut self, items: Vec<Content<L::Image>>) -> Result<(), Error> {
        let len = items.len();
        let mut queue = ContentQueue::new(items)?;
        let first = queue.next_item(self.loops);
        let second = queue.next_item(self.loops).or_else(|| first.clone());
        self.queue = Some(queue);

        let (current, next) = (self.surfaces.current(), self.surfaces.next());
        if let Some(content) = first {
            self.bind(current, content);
        }
        if let Some(content) = second {
            self.bind(next, content);
        }
        info!(items = len, loops = self.loops, "assigned content queue");
        Ok(())
    }

    /// Queue remote content by locator, optionally with one placeholder per locator.
    ///
    /// # Errors
    /// Returns [`Error::EmptyQueue`] for no locators and
    /// [`Error::QueueLengthMismatch`] when the placeholder count differs.
    pub fn assign_locators(
        &mut self,
        locators: Vec<String>,
        placeholders: Option<Vec<L::Image>>,
    ) -> Result<(), Error> {
        if locators.is_empty() {
            return Err(Error::EmptyQueue);
        }
        if let Some(placeholders) = &placeholders
            && placeholders.len() != locators.len()
        {
            return Err(Error::QueueLengthMismatch {
                locators: locators.len(),
                placeholders: placeholders.len(),
            });
        }
        let mut placeholders = placeholders.map(Vec::into_iter);
        let items = locators
            .into_iter()
            .map(|locator| Content::Remote {
                locator,
                placeholder: placeholders.as_mut().and_then(Iterator::next),
            })
            .collect();
        self.assign_queue(items)
    }

    /// Show one static image on both surfaces and drop any queue.
    pub fn set_image(&mut self, image: L::Image) {
        self.queue = None;
        for id in [self.surfaces.current(), self.surfaces.next()] {
            self.bind(id, Content::Image(image.clone()));
        }
    }

    /// Load one remote image onto both surfaces and drop any queue.
    pub fn fetch_image(&mut self, locator: &str, placeholder: Option<L::Image>) {
        self.queue = None;
        for id in [self.surfaces.current(), self.surfaces.next()] {
            self.bind(
                id,
                Content::Remote {
                    locator: locator.to_owned(),
                    placeholder: placeholder.clone(),
                },
            );
        }
    }

    /// Items still waiting in the prefetch ring.
    pub fn queued(&self) -> usize {
        self.queue.as_ref().map_or(0, |q| q.pending.len())
    }

    /// Apply finished loads. Called at the start of every tick; hosts may call it while idle.
    pub fn poll_loads(&mut self) {
        for result in self.loads_rx.try_iter() {
            let LoadResult {
                surface,
                ticket,
                locator,
                outcome,
            } = result;
            match outcome {
                Ok(image) => {
                    if self.surfaces.get_mut(surface).complete_load(ticket, image) {
                        debug!(%locator, surface = surface.index(), "content loaded");
                    } else {
                        debug!(%locator, surface = surface.index(), "dropping stale load");
                    }
                }
                Err(err) => {
                    warn!(%locator, error = %err, "failed to load content; keeping previous image");
                }
            }
        }
    }

    fn bind(&mut self, id: SurfaceId, content: Content<L::Image>) {
        match content {
            Content::Image(image) => {
                self.surfaces.get_mut(id).replace_content(Some(image));
            }
            Content::Remote {
                locator,
                placeholder,
            } => {
                let ticket = self.surfaces.get_mut(id).replace_content(placeholder.clone());
                let done = LoadCompletion::new(id, ticket, locator.clone(), self.loads_tx.clone());
                debug!(%locator, surface = id.index(), "requesting content");
                self.loader.load(&locator, placeholder.as_ref(), done);
            }
        }
    }

    fn advance_queue_into(&mut self, id: SurfaceId) {
        let item = match self.queue.as_mut() {
            Some(queue) => queue.next_item(self.loops),
            None => return,
        };
        match item {
            Some(content) => self.bind(id, content),
            None => debug!(surface = id.index(), "queue exhausted; keeping last content"),
        }
    }

    pub fn attach_tick_source(&mut self) {
        self.ticking = true;
    }

    pub fn detach_tick_source(&mut self) {
        self.ticking = false;
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True while any effect is alive, paused or not.
    pub fn is_animating(&self) -> bool {
        !self.effects.is_empty()
    }

    /// Begin the first effect on `current`. No-op unless idle.
    ///
    /// # Errors
    /// Propagates [`Error::InvalidRange`] from parameter drawing.
    pub fn start_animating(&mut self, now: Instant) -> Result<(), Error> {
        if self.state != PlaybackState::Idle {
            return Ok(());
        }
        self.start_new_effect(now)?;
        self.state = PlaybackState::Animating;
        self.attach_tick_source();
        info!("animation started");
        Ok(())
    }

    /// Drop every effect without running its callbacks and reset both surfaces. Idempotent.
    pub fn stop_animating(&mut self) {
        self.detach_tick_source();
        self.effects.clear();
        self.events_rx.try_iter().for_each(drop);
        self.queue = None;
        self.resumed_at = None;
        for surface in self.surfaces.iter_mut() {
            surface.reset(self.bounds);
        }
        if self.state != PlaybackState::Idle {
            info!("animation stopped");
        }
        self.state = PlaybackState::Idle;
    }

    pub fn pause(&mut self, now: Instant) {
        if self.state != PlaybackState::Animating {
            return;
        }
        self.detach_tick_source();
        self.state = PlaybackState::Paused { since: now };
        debug!("animation paused");
    }

    /// Shift every effect's start by the paused interval so progress picks up where it stopped.
    pub fn resume(&mut self, now: Instant) {
        let PlaybackState::Paused { since } = self.state else {
            return;
        };
        let gap = now.saturating_duration_since(since);
        for effect in &mut self.effects {
            effect.shift_start(gap);
        }
        self.state = PlaybackState::Animating;
        self.resumed_at = Some(now);
        self.attach_tick_source();
        debug!(paused_for = ?gap, "animation resumed");
    }

    /// Begin fading the current effect out now. Ignored while a cross-fade is already running.
    pub fn skip_to_next(&mut self, now: Instant) -> bool {
        if self.state != PlaybackState::Animating {
            return false;
        }
        let current = self.surfaces.current();
        match self.effects.as_mut_slice() {
            [effect] if effect.surface() == current => {
                effect.fade_out_now(now);
                debug!(effect = %effect.id(), "skipping to next");
                true
            }
            _ => false,
        }
    }

    /// Advance one display frame.
    ///
    /// A `now` older than the last resume is treated as the resume instant, so
    /// progress never steps backwards across a pause.
    ///
    /// # Errors
    /// Propagates [`Error::InvalidRange`] if a replacement effect cannot be drawn.
    pub fn tick(&mut self, now: Instant) -> Result<Vec<Transition>, Error> {
        if !self.ticking || self.state != PlaybackState::Animating {
            return Ok(Vec::new());
        }
        let now = self.resumed_at.map_or(now, |resumed| now.max(resumed));
        self.poll_loads();

        for effect in &mut self.effects {
            effect.update(now, self.surfaces.get_mut(effect.surface()));
        }

        let events: Vec<EffectEvent> = self.events_rx.try_iter().collect();
        let mut transitions = Vec::new();
        for event in events {
            match event {
                EffectEvent::WillFadeOut(id) => {
                    if let Some(transition) = self.swap_for(id, now, &mut transitions)? {
                        transitions.push(transition);
                    }
                }
                EffectEvent::Finished(id) => {
                    if self.retire(id) {
                        transitions.push(Transition::Retired(id));
                    }
                }
            }
        }
        Ok(transitions)
    }

    fn swap_for(
        &mut self,
        faded: EffectId,
        now: Instant,
        transitions: &mut Vec<Transition>,
    ) -> Result<Option<Transition>, Error> {
        let current = self.surfaces.current();
        let on_current = self
            .effects
            .iter()
            .any(|e| e.id() == faded && e.surface() == current);
        if !on_current {
            return Ok(None);
        }

        // An older effect still fading on the incoming surface is cut short.
        let incoming = self.surfaces.next();
        let stragglers: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|e| e.surface() == incoming)
            .map(KenBurnsEffect::id)
            .collect();
        for id in stragglers {
            if self.retire(id) {
                transitions.push(Transition::Retired(id));
            }
        }

        self.surfaces.bring_to_front(current);
        self.surfaces.swap();
        let started = self.start_new_effect(now)?;
        debug!(%faded, %started, surface = self.surfaces.current().index(), "swapped surfaces");
        Ok(Some(Transition::Swapped { faded, started }))
    }

    /// Remove a finished effect and preload the following item into the surface it leaves idle.
    fn retire(&mut self, id: EffectId) -> bool {
        let Some(pos) = self.effects.iter().position(|e| e.id() == id) else {
            return false;
        };
        let effect = self.effects.remove(pos);
        debug!(effect = %id, surface = effect.surface().index(), "effect finished");
        if effect.surface() == self.surfaces.next() {
            self.advance_queue_into(effect.surface());
        }
        true
    }

    fn start_new_effect(&mut self, now: Instant) -> Result<EffectId, Error> {
        let id = self.surfaces.current();
        self.surfaces.get_mut(id).reset(self.bounds);

        let mut effect = KenBurnsEffect::new(id, &self.options, &mut self.rng, now)?;
        let tx = self.events_tx.clone();
        effect.on_will_fade_out(move |e| {
            let _ = tx.send(EffectEvent::WillFadeOut(e));
        });
        let tx = self.events_tx.clone();
        effect.on_finished(move |e| {
            let _ = tx.send(EffectEvent::Finished(e));
        });

        let params = effect.params();
        debug!(
            effect = %effect.id(),
            surface = id.index(),
            zoom = params.zoom,
            offset_x = params.offset_x,
            offset_y = params.offset_y,
            duration = ?params.duration,
            "starting effect"
        );
        let effect_id = effect.id();
        self.effects.push(effect);
        Ok(effect_id)
    }

    pub fn surface(&self, id: SurfaceId) -> &Surface<L::Image> {
        self.surfaces.get(id)
    }

    pub fn current_surface(&self) -> SurfaceId {
        self.surfaces.current()
    }

    pub fn next_surface(&self) -> SurfaceId {
        self.surfaces.next()
    }

    /// Compositing order for the host, bottom first.
    pub fn surfaces_back_to_front(&self) -> [SurfaceId; 2] {
        self.surfaces.back_to_front()
    }

    pub fn active_effects(&self) -> &[KenBurnsEffect] {
        &self.effects
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingLoader {
        requests: Vec<LoadCompletion<&'static str>>,
    }

    impl ImageLoader for RecordingLoader {
        type Image = &'static str;

        fn load(
            &mut self,
            _locator: &str,
            _placeholder: Option<&Self::Image>,
            done: LoadCompletion<Self::Image>,
        ) {
            self.requests.push(done);
        }
    }

    fn presenter() -> Presenter<RecordingLoader> {
        let mut p = Presenter::with_rng(
            RecordingLoader::default(),
            Size::new(320.0, 200.0),
            RandomSource::seeded(7),
        );
        p.set_duration_range(Duration::from_secs(10), Duration::from_secs(10))
            .unwrap();
        p
    }

    fn images(names: &[&'static str]) -> Vec<Content<&'static str>> {
        names.iter().map(|n| Content::Image(*n)).collect()
    }

    fn secs(t0: Instant, s: f64) -> Instant {
        t0 + Duration::from_secs_f64(s)
    }

    fn content_of(p: &Presenter<RecordingLoader>, id: SurfaceId) -> Option<&'static str> {
        p.surface(id).content().copied()
    }

    #[test]
    fn empty_queue_leaves_playback_alone() {
        let mut p = presenter();
        p.assign_queue(images(&["a", "b"])).unwrap();
        assert!(matches!(p.assign_queue(Vec::new()), Err(Error::EmptyQueue)));
        assert!(matches!(
            p.assign_locators(Vec::new(), None),
            Err(Error::EmptyQueue)
        ));
        assert_eq!(content_of(&p, p.current_surface()), Some("a"));
        assert_eq!(content_of(&p, p.next_surface()), Some("b"));
    }

    #[test]
    fn placeholder_count_must_match() {
        let mut p = presenter();
        let err = p
            .assign_locators(vec!["x".into(), "y".into()], Some(vec!["px"]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::QueueLengthMismatch {
                locators: 2,
                placeholders: 1
            }
        ));
        assert!(p.loader().requests.is_empty());
    }

    #[test]
    fn setters_validate() {
        let mut p = presenter();
        assert!(p.set_zoom_intensity(1.5).is_err());
        assert!(p.set_zoom_intensity(f64::NAN).is_err());
        assert!(p.set_zoom_intensity(0.25).is_ok());
        assert!(
            p.set_duration_range(Duration::from_secs(5), Duration::from_secs(4))
                .is_err()
        );
        assert!(p.set_duration_range(Duration::ZERO, Duration::from_secs(4)).is_err());
        assert!(p.set_duration_range(Duration::MAX, Duration::MAX).is_err());
        assert_eq!(p.options().zoom_intensity, 0.25);
        assert_eq!(p.options().min_duration, Duration::from_secs(10));
    }

    #[test]
    fn swaps_at_fade_and_preloads_after_finish() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.set_loops(false);
        p.assign_queue(images(&["a", "b", "c", "d"])).unwrap();
        let first = p.current_surface();
        let second = p.next_surface();

        p.start_animating(t0).unwrap();
        assert_eq!(p.state(), PlaybackState::Animating);
        assert_eq!(p.active_effects().len(), 1);
        assert!(p.tick(secs(t0, 1.0)).unwrap().is_empty());

        let t = p.tick(secs(t0, 8.5)).unwrap();
        assert!(matches!(t.as_slice(), [Transition::Swapped { .. }]));
        assert_eq!(p.current_surface(), second);
        assert_eq!(p.surfaces_back_to_front(), [second, first]);
        assert_eq!(p.active_effects().len(), 2);

        let t = p.tick(secs(t0, 10.0)).unwrap();
        assert!(matches!(t.as_slice(), [Transition::Retired(_)]));
        assert_eq!(p.active_effects().len(), 1);
        assert_eq!(content_of(&p, first), Some("c"));

        p.tick(secs(t0, 17.0)).unwrap();
        assert_eq!(p.current_surface(), first);
        p.tick(secs(t0, 18.5)).unwrap();
        assert_eq!(content_of(&p, second), Some("d"));

        p.tick(secs(t0, 25.5)).unwrap();
        p.tick(secs(t0, 27.0)).unwrap();
        // exhausted without looping: the idle surface keeps what it had
        assert_eq!(content_of(&p, first), Some("c"));
        assert_eq!(p.active_effects().len(), 1);
    }

    #[test]
    fn looping_queue_starts_over() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.assign_queue(images(&["a", "b"])).unwrap();
        let first = p.current_surface();
        p.start_animating(t0).unwrap();
        p.tick(secs(t0, 8.5)).unwrap();
        p.tick(secs(t0, 10.0)).unwrap();
        assert_eq!(content_of(&p, first), Some("a"));
    }

    #[test]
    fn single_item_fills_both_surfaces() {
        let mut p = presenter();
        p.set_loops(false);
        p.assign_queue(images(&["only"])).unwrap();
        assert_eq!(content_of(&p, p.current_surface()), Some("only"));
        assert_eq!(content_of(&p, p.next_surface()), Some("only"));
    }

    #[test]
    fn one_late_tick_swaps_then_retires() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.assign_queue(images(&["a", "b", "c"])).unwrap();
        p.start_animating(t0).unwrap();
        let t = p.tick(secs(t0, 30.0)).unwrap();
        assert!(matches!(
            t.as_slice(),
            [Transition::Swapped { .. }, Transition::Retired(_)]
        ));
        assert_eq!(p.active_effects().len(), 1);
        assert_eq!(content_of(&p, p.next_surface()), Some("c"));
    }

    #[test]
    fn pause_resume_is_continuous() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.assign_queue(images(&["a", "b"])).unwrap();
        p.start_animating(t0).unwrap();
        p.tick(secs(t0, 3.0)).unwrap();
        let before = p.active_effects()[0].progress(secs(t0, 3.0));
        let scale_before = p.surface(p.current_surface()).scale;

        p.pause(secs(t0, 3.0));
        assert!(matches!(p.state(), PlaybackState::Paused { .. }));
        assert!(!p.is_ticking());
        assert!(p.is_animating());
        assert!(p.tick(secs(t0, 20.0)).unwrap().is_empty());
        assert_eq!(p.surface(p.current_surface()).scale, scale_before);

        p.resume(secs(t0, 20.0));
        let after = p.active_effects()[0].progress(secs(t0, 20.0));
        assert!((after - before).abs() < 1e-9);
        assert!(p.tick(secs(t0, 24.0)).unwrap().is_empty());
        let t = p.tick(secs(t0, 25.5)).unwrap();
        assert!(matches!(t.as_slice(), [Transition::Swapped { .. }]));
    }

    #[test]
    fn tick_stamped_before_resume_does_not_rewind() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.assign_queue(images(&["a", "b"])).unwrap();
        p.start_animating(t0).unwrap();
        p.tick(secs(t0, 3.0)).unwrap();
        let scale_at_pause = p.surface(p.current_surface()).scale;

        p.pause(secs(t0, 3.0));
        p.resume(secs(t0, 20.0));
        p.tick(secs(t0, 19.5)).unwrap();
        assert_eq!(p.surface(p.current_surface()).scale, scale_at_pause);

        p.tick(secs(t0, 21.0)).unwrap();
        assert!(p.surface(p.current_surface()).scale > scale_at_pause);
    }

    #[test]
    fn stop_resets_and_is_idempotent() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.assign_queue(images(&["a", "b", "c"])).unwrap();
        p.start_animating(t0).unwrap();
        p.tick(secs(t0, 8.5)).unwrap();
        assert_eq!(p.active_effects().len(), 2);

        p.stop_animating();
        p.stop_animating();
        assert_eq!(p.state(), PlaybackState::Idle);
        assert!(!p.is_animating());
        assert!(!p.is_ticking());
        assert_eq!(p.queued(), 0);
        for id in p.surfaces_back_to_front() {
            let s = p.surface(id);
            assert_eq!((s.scale, s.alpha, s.origin), (1.0, 1.0, (0.0, 0.0)));
            assert_eq!(s.size, Size::new(320.0, 200.0));
        }
        assert!(p.tick(secs(t0, 40.0)).unwrap().is_empty());
    }

    #[test]
    fn detached_ticks_are_ignored() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.set_image("still");
        p.start_animating(t0).unwrap();
        p.detach_tick_source();
        assert!(p.tick(secs(t0, 30.0)).unwrap().is_empty());
        assert_eq!(p.active_effects().len(), 1);
        p.attach_tick_source();
        assert!(!p.tick(secs(t0, 30.0)).unwrap().is_empty());
    }

    #[test]
    fn skip_forces_fade_from_now() {
        let t0 = Instant::now();
        let mut p = presenter();
        p.assign_queue(images(&["a", "b"])).unwrap();
        p.start_animating(t0).unwrap();
        assert!(p.skip_to_next(secs(t0, 1.0)));
        assert_eq!(
            p.active_effects()[0].params().duration,
            Duration::from_secs(3)
        );
        let t = p.tick(secs(t0, 1.1)).unwrap();
        assert!(matches!(t.as_slice(), [Transition::Swapped { .. }]));
        // a cross-fade is running, so a second skip waits
        assert!(!p.skip_to_next(secs(t0, 1.2)));
        let t = p.tick(secs(t0, 3.0)).unwrap();
        assert!(matches!(t.as_slice(), [Transition::Retired(_)]));
    }

    #[test]
    fn loads_land_on_their_surface() {
        let mut p = presenter();
        p.assign_locators(
            vec!["x".into(), "y".into(), "z".into()],
            Some(vec!["px", "py", "pz"]),
        )
        .unwrap();
        let (current, next) = (p.current_surface(), p.next_surface());
        assert_eq!(content_of(&p, current), Some("px"));
        assert_eq!(content_of(&p, next), Some("py"));

        let mut requests = std::mem::take(&mut p.loader_mut().requests);
        assert_eq!(requests.len(), 2);
        let y = requests.pop().unwrap();
        let x = requests.pop().unwrap();
        assert_eq!(x.locator(), "x");
        x.complete(Ok("X"));
        y.complete(Err(anyhow::anyhow!("decode failed")));
        p.poll_loads();
        assert_eq!(content_of(&p, current), Some("X"));
        assert_eq!(content_of(&p, next), Some("py"));
    }

    #[test]
    fn superseded_load_is_dropped() {
        let mut p = presenter();
        p.fetch_image("remote", None);
        let requests = std::mem::take(&mut p.loader_mut().requests);
        assert_eq!(requests.len(), 2);
        p.set_image("local");
        for done in requests {
            done.complete(Ok("late"));
        }
        p.poll_loads();
        assert_eq!(content_of(&p, p.current_surface()), Some("local"));
        assert_eq!(content_of(&p, p.next_surface()), Some("local"));
    }
}
