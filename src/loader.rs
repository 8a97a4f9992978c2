//! Seam to the external image loader.
//!
//! The controller never fetches or decodes. It hands a locator to an
//! [`ImageLoader`] together with a [`LoadCompletion`]; the loader resolves the
//! completion whenever it is done, from any thread, and the controller applies
//! the result on its next tick.

use crossbeam_channel::Sender;

use crate::events::LoadResult;
use crate::surface::SurfaceId;

pub trait ImageLoader {
    type Image: Clone;

    /// Start resolving `locator`. `placeholder` is already on screen while this runs.
    fn load(
        &mut self,
        locator: &str,
        placeholder: Option<&Self::Image>,
        done: LoadCompletion<Self::Image>,
    );
}

/// Single-use handle for reporting a load back to the controller.
///
/// Consuming `self` makes completing twice impossible.
#[derive(Debug)]
pub struct LoadCompletion<I> {
    surface: SurfaceId,
    ticket: u64,
    locator: String,
    tx: Sender<LoadResult<I>>,
}

impl<I> LoadCompletion<I> {
    pub(crate) fn new(
        surface: SurfaceId,
        ticket: u64,
        locator: String,
        tx: Sender<LoadResult<I>>,
    ) -> Self {
        Self {
            surface,
            ticket,
            locator,
            tx,
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn complete(self, outcome: anyhow::Result<I>) {
        // a dropped controller has nobody left to show the image to
        let _ = self.tx.send(LoadResult {
            surface: self.surface,
            ticket: self.ticket,
            locator: self.locator,
            outcome,
        });
    }
}
