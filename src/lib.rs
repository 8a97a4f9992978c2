//! Ken Burns pan/zoom/fade scheduling with double-buffered cross-fades.
//!
//! The [`presenter::Presenter`] is the entry point: hand it content, start it
//! and call `tick(now)` once per display refresh. Fetching and decoding live
//! behind [`loader::ImageLoader`].

pub mod buffer;
pub mod config;
pub mod effect;
pub mod error;
pub mod events;
pub mod loader;
pub mod presenter;
pub mod random;
pub mod scan;
pub mod surface;
pub mod tasks {
    pub mod driver;
    pub mod loader;
}

pub use error::Error;
