use thiserror::Error;

/// Library error type for ken-burns operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A content queue was assigned with no items.
    #[error("content queue must contain at least one item")]
    EmptyQueue,

    /// A placeholder list was supplied whose length differs from the locator list.
    #[error("placeholder count {placeholders} does not match locator count {locators}")]
    QueueLengthMismatch { locators: usize, placeholders: usize },

    /// A random range was empty or inverted.
    #[error("invalid random range [{min}, {max})")]
    InvalidRange { min: f64, max: f64 },

    /// Zoom intensity outside `[0, 1]`.
    #[error("zoom intensity must be within [0, 1], got {0}")]
    InvalidZoomIntensity(f64),

    /// One or more configured photo directories are invalid or unreadable.
    #[error("invalid photo directory: {0}")]
    BadDir(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}
