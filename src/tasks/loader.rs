use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use tokio::runtime::Handle;
use tokio::select;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::loader::{ImageLoader, LoadCompletion};

/// Decodes files off the tick thread.
///
/// Each request becomes a tokio task that waits for one of `max_in_flight`
/// permits, decodes on the blocking pool and resolves the completion.
/// Locators are file paths.
pub struct DecodingLoader {
    runtime: Handle,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl DecodingLoader {
    pub fn new(runtime: Handle, max_in_flight: usize, cancel: CancellationToken) -> Self {
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            cancel,
        }
    }
}

impl ImageLoader for DecodingLoader {
    type Image = Arc<RgbaImage>;

    fn load(
        &mut self,
        locator: &str,
        _placeholder: Option<&Self::Image>,
        done: LoadCompletion<Self::Image>,
    ) {
        let path = PathBuf::from(locator);
        let permits = self.permits.clone();
        let cancel = self.cancel.clone();
        self.runtime.spawn(async move {
            let _permit = select! {
                _ = cancel.cancelled() => return,
                permit = permits.acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => return,
                },
            };
            let decoded = tokio::task::spawn_blocking(move || decode_rgba8(&path)).await;
            let outcome = match decoded {
                Ok(res) => res.map(Arc::new),
                Err(join) => Err(anyhow!(join).context("decode task failed")),
            };
            done.complete(outcome);
        });
    }
}

fn decode_rgba8(path: &Path) -> Result<RgbaImage> {
    let img = image::ImageReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("decoding {}", path.display()))?;
    let rgba = img.to_rgba8();
    debug!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "decoded"
    );
    Ok(rgba)
}
