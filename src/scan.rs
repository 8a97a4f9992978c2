//! Directory scanning utilities for discovering image files.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

/// Options controlling directory scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional override for allowed extensions (lowercase, without dot).
    pub exts: Option<Vec<&'static str>>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            exts: None,
        }
    }
}

/// Return `true` if `path` has an allowed image extension.
#[must_use]
pub fn is_supported_image(path: &Path, exts: Option<&[&str]>) -> bool {
    let default_exts: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
    let exts = exts.unwrap_or(default_exts);
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| *e == ext)
        })
}

/// Scan `paths` for images, returning them sorted so queue order is stable.
///
/// # Errors
/// Returns [`Error::BadDir`] if any path is missing or not a directory.
pub fn scan_with_options(paths: &[PathBuf], opts: &ScanOptions) -> Result<Vec<PathBuf>, Error> {
    let bad: Vec<_> = paths
        .iter()
        .filter(|p| !p.is_dir())
        .map(|p| p.to_string_lossy())
        .collect();
    if !bad.is_empty() {
        return Err(Error::BadDir(bad.join(", ")));
    }

    let mut out = Vec::new();
    for root in paths {
        let mut wd = WalkDir::new(root).follow_links(true);
        if !opts.recursive {
            wd = wd.max_depth(1);
        }
        for entry in wd
            .into_iter()
            .filter_entry(|e| !should_skip_dir(e))
            .flatten()
        {
            let path = entry.path();
            if entry.file_type().is_file() && is_supported_image(path, opts.exts.as_deref()) {
                out.push(path.to_path_buf());
            }
        }
    }
    out.sort();
    Ok(out)
}

fn should_skip_dir(entry: &DirEntry) -> bool {
    // Never skip the root; tempfile roots can be dot-dirs.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a/B.JPG"), None));
        assert!(is_supported_image(Path::new("x.webp"), None));
        assert!(!is_supported_image(Path::new("notes.txt"), None));
        assert!(!is_supported_image(Path::new("noext"), None));
        assert!(is_supported_image(Path::new("x.tga"), Some(&["tga"])));
    }
}
