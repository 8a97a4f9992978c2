//! Presentation surfaces and the current/next indirection.

/// Width/height in host units (points or pixels, whatever the host renders in).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Index of a surface in the controller's two-slot arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(usize);

impl SurfaceId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One presentable element: displayed content plus the transform an effect drives.
#[derive(Debug, Clone)]
pub struct Surface<I> {
    content: Option<I>,
    ticket: u64,
    pub scale: f64,
    pub origin: (f64, f64),
    pub alpha: f64,
    pub size: Size,
}

impl<I> Surface<I> {
    fn new(size: Size) -> Self {
        Self {
            content: None,
            ticket: 0,
            scale: 1.0,
            origin: (0.0, 0.0),
            alpha: 1.0,
            size,
        }
    }

    /// Content currently on display, if any has been bound.
    pub fn content(&self) -> Option<&I> {
        self.content.as_ref()
    }

    /// Identity scale, full opacity, home position, sized to `bounds`.
    pub fn reset(&mut self, bounds: Size) {
        self.scale = 1.0;
        self.origin = (0.0, 0.0);
        self.alpha = 1.0;
        self.size = bounds;
    }

    /// Replace the displayed content and invalidate outstanding loads for this surface.
    pub(crate) fn replace_content(&mut self, content: Option<I>) -> u64 {
        if content.is_some() {
            self.content = content;
        }
        self.ticket = self.ticket.wrapping_add(1);
        self.ticket
    }

    /// Apply a finished load if it still belongs to the latest request.
    pub(crate) fn complete_load(&mut self, ticket: u64, image: I) -> bool {
        if ticket != self.ticket {
            return false;
        }
        self.content = Some(image);
        true
    }
}

/// Two surfaces whose roles are exchanged by swapping indices, never by moving data.
#[derive(Debug, Clone)]
pub struct SurfacePair<I> {
    surfaces: [Surface<I>; 2],
    current: usize,
    front: usize,
}

impl<I> SurfacePair<I> {
    pub fn new(bounds: Size) -> Self {
        Self {
            surfaces: [Surface::new(bounds), Surface::new(bounds)],
            current: 0,
            front: 0,
        }
    }

    pub fn current(&self) -> SurfaceId {
        SurfaceId(self.current)
    }

    pub fn next(&self) -> SurfaceId {
        SurfaceId(1 - self.current)
    }

    pub fn get(&self, id: SurfaceId) -> &Surface<I> {
        &self.surfaces[id.0]
    }

    pub fn get_mut(&mut self, id: SurfaceId) -> &mut Surface<I> {
        &mut self.surfaces[id.0]
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Surface<I>> {
        self.surfaces.iter_mut()
    }

    /// Exchange roles: `next` becomes `current` and vice versa.
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Place `id` on top of the visual stack.
    pub fn bring_to_front(&mut self, id: SurfaceId) {
        self.front = id.0;
    }

    /// Stacking order for the host to composite, bottom first.
    pub fn back_to_front(&self) -> [SurfaceId; 2] {
        [SurfaceId(1 - self.front), SurfaceId(self.front)]
    }
}
