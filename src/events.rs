use crate::effect::EffectId;
use crate::surface::SurfaceId;

/// One item of a content queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Content<I> {
    /// Already decoded content, bound directly.
    Image(I),
    /// Content resolved by the image loader; the placeholder shows until it arrives.
    Remote { locator: String, placeholder: Option<I> },
}

impl<I> Content<I> {
    pub fn remote(locator: impl Into<String>) -> Self {
        Self::Remote {
            locator: locator.into(),
            placeholder: None,
        }
    }
}

/// Threshold crossings reported by effects during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectEvent {
    WillFadeOut(EffectId),
    Finished(EffectId),
}

/// Result of one loader request, routed back to the surface that asked for it.
#[derive(Debug)]
pub struct LoadResult<I> {
    pub surface: SurfaceId,
    pub ticket: u64,
    pub locator: String,
    pub outcome: anyhow::Result<I>,
}

/// What a tick changed, for hosts that log or react to transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Roles exchanged; `started` now animates the new current surface.
    Swapped { faded: EffectId, started: EffectId },
    /// An effect completed and left the active set.
    Retired(EffectId),
}
