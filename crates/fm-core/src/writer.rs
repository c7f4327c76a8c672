//! Writing generated pages to disk.

use std::fs;
use std::path::{Component, Path, PathBuf};

use fm_cache::Cache;
use sha2::{Digest, Sha256};

use crate::generate::Page;

/// Error returned when a page cannot be written.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// File system failure.
    #[error("Cannot write {}: {source}", .path.display())]
    Io {
        /// Destination file or folder.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The page path leaves the output folder.
    #[error("Page path {0} points outside the output folder")]
    OutsideOutput(String),
}

/// Outcome of [`save_pages_with_cache`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveStats {
    /// Pages written to disk.
    pub written: usize,
    /// Pages skipped because their content did not change.
    pub unchanged: usize,
}

/// Destination of `page_path` inside `folder`.
///
/// Leading slashes are ignored, so `/index.html` lands in `folder/index.html`.
/// Paths with `..` or a drive prefix are rejected.
fn output_path(folder: &Path, page_path: &str) -> Result<PathBuf, WriteError> {
    let relative = Path::new(page_path.trim_start_matches(['/', '\\']));
    let inside = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if !inside || relative.as_os_str().is_empty() {
        return Err(WriteError::OutsideOutput(page_path.to_owned()));
    }
    Ok(folder.join(relative))
}

/// Write `page` to `folder/page_path`, creating parent folders.
pub fn save_page(page: &Page, folder: &Path) -> Result<(), WriteError> {
    let path = output_path(folder, &page.page_path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| WriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, &page.content).map_err(|source| WriteError::Io { path, source })
}

/// Write all pages in order. Stops at the first failure; pages already
/// written stay on disk.
pub fn save_pages(pages: &[Page], folder: &Path) -> Result<(), WriteError> {
    pages.iter().try_for_each(|page| save_page(page, folder))
}

/// Write pages whose content changed since the previous build.
///
/// The cache maps page paths to content hashes. A page is skipped when its
/// hash matches the cached one and the output file still exists. Every page
/// is recorded in the cache; flushing it is up to the caller.
pub fn save_pages_with_cache(
    pages: &[Page],
    folder: &Path,
    cache: &mut dyn Cache,
) -> Result<SaveStats, WriteError> {
    let mut stats = SaveStats::default();
    for page in pages {
        let hash = content_hash(&page.content);
        let unchanged = cache.get(&page.page_path).as_deref() == Some(hash.as_str())
            && output_path(folder, &page.page_path)?.is_file();

        if unchanged {
            stats.unchanged += 1;
        } else {
            save_page(page, folder)?;
            stats.written += 1;
        }
        cache.set(&page.page_path, hash);
    }
    tracing::debug!(
        written = stats.written,
        unchanged = stats.unchanged,
        "Saved pages"
    );
    Ok(stats)
}

fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
