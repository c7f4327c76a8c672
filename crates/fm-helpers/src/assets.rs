//! Static asset helpers: `assetFilepath`, `fingerprint`, `embedFile` and
//! `inlineFile`.
//!
//! Asset paths are resolved against the `assetsFolder` option. File reads
//! and hashes are memoized for the lifetime of an [`AssetFiles`] value,
//! which is one build.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fm_core::{HelperError, RenderContext, remove_extension};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::args;
use crate::options::option;

/// Hex characters of the content hash appended by `fingerprint`.
const FINGERPRINT_LEN: usize = 8;

/// Path of a static file: `assetsFolder` joined with `url`.
pub fn asset_filepath(ctx: &RenderContext, url: &str) -> Result<PathBuf, HelperError> {
    let folder = args::display(&option(ctx, "assetsFolder")?);
    Ok(Path::new(&folder).join(url.trim_start_matches('/')))
}

/// Memoized asset reads shared by the asset helpers.
#[derive(Debug, Default)]
pub struct AssetFiles {
    contents: Mutex<HashMap<PathBuf, String>>,
    fingerprints: Mutex<HashMap<PathBuf, String>>,
}

impl AssetFiles {
    /// Create an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text content of a static file.
    pub fn embed(&self, ctx: &RenderContext, url: &str) -> Result<String, HelperError> {
        let path = asset_filepath(ctx, url)?;
        let mut contents = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(content) = contents.get(&path) {
            return Ok(content.clone());
        }
        let content = fs::read_to_string(&path).map_err(|source| HelperError::Io {
            path: path.clone(),
            source,
        })?;
        contents.insert(path, content.clone());
        Ok(content)
    }

    /// Static file content preceded by a `/*name*/` comment.
    pub fn inline(&self, ctx: &RenderContext, url: &str) -> Result<String, HelperError> {
        let content = self.embed(ctx, url)?;
        Ok(format!("/*{}*/{content}", remove_extension(url)))
    }

    /// `url?<hash>` where `<hash>` is derived from the file content.
    pub fn fingerprint(&self, ctx: &RenderContext, url: &str) -> Result<String, HelperError> {
        let path = asset_filepath(ctx, url)?;
        let mut fingerprints = self
            .fingerprints
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(hash) = fingerprints.get(&path) {
            return Ok(format!("{url}?{hash}"));
        }

        let bytes = fs::read(&path).map_err(|source| HelperError::Io {
            path: path.clone(),
            source,
        })?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let mut hash = hex::encode(hasher.finalize());
        hash.truncate(FINGERPRINT_LEN);
        tracing::debug!(path = %path.display(), hash = %hash, "Fingerprinted asset");

        let result = format!("{url}?{hash}");
        fingerprints.insert(path, hash);
        Ok(result)
    }
}

pub(crate) fn asset_filepath_helper(
    ctx: &RenderContext,
    args: &[Value],
) -> Result<Value, HelperError> {
    let path = asset_filepath(ctx, &args::string("assetFilepath", args, 0)?)?;
    Ok(Value::from(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_core::{Document, Helpers, make_context};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    static_assertions::assert_impl_all!(AssetFiles: Send, Sync);

    fn ctx(folder: &Path) -> RenderContext {
        make_context(
            &Document::new(),
            &json!({"base": {"assetsFolder": folder.display().to_string()}}),
            &Helpers::new(),
        )
    }

    #[test]
    fn test_asset_filepath() {
        let ctx = ctx(Path::new("test/samples"));
        assert_eq!(
            asset_filepath(&ctx, "images/photo.jpg").unwrap(),
            PathBuf::from("test/samples/images/photo.jpg")
        );
        assert_eq!(
            asset_filepath(&ctx, "/images/photo.jpg").unwrap(),
            PathBuf::from("test/samples/images/photo.jpg")
        );
    }

    #[test]
    fn test_embed_and_inline() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), "Hello.").unwrap();
        let ctx = ctx(tmp.path());
        let assets = AssetFiles::new();

        assert_eq!(assets.embed(&ctx, "file.txt").unwrap(), "Hello.");
        assert_eq!(assets.inline(&ctx, "file.txt").unwrap(), "/*file*/Hello.");
    }

    #[test]
    fn test_embed_is_memoized() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), "Hello.").unwrap();
        let ctx = ctx(tmp.path());
        let assets = AssetFiles::new();

        assets.embed(&ctx, "file.txt").unwrap();
        fs::write(tmp.path().join("file.txt"), "Changed.").unwrap();

        assert_eq!(assets.embed(&ctx, "file.txt").unwrap(), "Hello.");
    }

    #[test]
    fn test_fingerprint() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), "Hello.").unwrap();
        let ctx = ctx(tmp.path());
        let assets = AssetFiles::new();

        let url = assets.fingerprint(&ctx, "file.txt").unwrap();

        let (name, hash) = url.split_once('?').unwrap();
        assert_eq!(name, "file.txt");
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(assets.fingerprint(&ctx, "file.txt").unwrap(), url);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let ctx = ctx(tmp.path());
        let err = AssetFiles::new().embed(&ctx, "nope.css").unwrap_err();
        assert!(matches!(err, HelperError::Io { .. }));
    }
}
