//! Source file discovery and loading.

use std::fs;
use std::path::{Component, Path, PathBuf};

use glob::MatchOptions;

use crate::document::Document;
use crate::parser::{ParseOptions, parse_page};

/// Error returned when source files cannot be listed or read.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Invalid glob pattern built from the folder or an extension.
    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    /// A source file could not be read.
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// List source files under `folder` with one of `extensions`.
///
/// Recursive. Hidden files are skipped. Returned paths are
/// relative to `folder`, `/`-separated and sorted.
pub fn get_source_files_list<S: AsRef<str>>(
    folder: &Path,
    extensions: &[S],
) -> Result<Vec<String>, LoadError> {
    let folder = if folder.as_os_str().is_empty() {
        Path::new(".")
    } else {
        folder
    };
    let escaped = glob::Pattern::escape(&folder.to_string_lossy());
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for extension in extensions {
        let pattern = format!(
            "{escaped}/**/*.{}",
            glob::Pattern::escape(extension.as_ref())
        );
        for entry in glob::glob_with(&pattern, options)? {
            match entry {
                Ok(path) if path.is_file() => files.push(relative_path(&path, folder)),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable source path"),
            }
        }
    }
    files.sort();
    files.dedup();

    Ok(files)
}

/// Load and parse all source files under `folder` with one of `extensions`.
///
/// Each document's `sourcePath` is relative to `folder`. Finding no files
/// is not an error: a warning is logged and the result is empty.
pub fn load_source_files<S: AsRef<str>>(
    folder: &Path,
    extensions: &[S],
    options: &ParseOptions,
) -> Result<Vec<Document>, LoadError> {
    let files = get_source_files_list(folder, extensions)?;
    if files.is_empty() {
        let extensions: Vec<&str> = extensions.iter().map(|e| e.as_ref()).collect();
        tracing::warn!(
            folder = %folder.display(),
            extensions = ?extensions,
            "No source files found"
        );
        return Ok(Vec::new());
    }

    files
        .iter()
        .map(|filepath| {
            let path = folder.join(filepath);
            let source = fs::read_to_string(&path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            Ok(parse_page(&source, filepath, options))
        })
        .collect()
}

/// Path of `path` relative to `base`, joined with `/`.
fn relative_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RendererTable;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_get_source_files_list() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "index.md", "");
        write(tmp.path(), "en/post.md", "");
        write(tmp.path(), "en/about.html", "");
        write(tmp.path(), "ru/deep/nested.md", "");
        write(tmp.path(), "notes.txt", "");

        let files = get_source_files_list(tmp.path(), &["md", "html"]).unwrap();

        assert_eq!(
            files,
            vec!["en/about.html", "en/post.md", "index.md", "ru/deep/nested.md"]
        );
    }

    #[test]
    fn test_get_source_files_list_skips_hidden() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "visible.md", "");
        write(tmp.path(), ".draft.md", "");

        let files = get_source_files_list(tmp.path(), &["md"]).unwrap();

        assert_eq!(files, vec!["visible.md"]);
    }

    #[test]
    fn test_get_source_files_list_missing_folder() {
        let tmp = TempDir::new().unwrap();
        let files = get_source_files_list(&tmp.path().join("missing"), &["md"]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_load_source_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "en/hello.md", "---\ntitle: Hello\n---\nworld");
        write(tmp.path(), "index.html", "<b>home</b>");

        let options = ParseOptions {
            renderers: RendererTable::new().with("md", |s: &str| s.to_uppercase()),
            ..ParseOptions::default()
        };
        let docs = load_source_files(tmp.path(), &["md", "html"], &options).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].source_path(), Some("en/hello.md"));
        assert_eq!(docs[0].url(), Some("/en/hello"));
        assert_eq!(docs[0].content(), Some("WORLD"));
        assert_eq!(docs[0].get_str("title"), Some("Hello"));
        assert_eq!(docs[1].source_path(), Some("index.html"));
        assert_eq!(docs[1].url(), Some("/"));
        assert_eq!(docs[1].content(), Some("<b>home</b>"));
    }

    #[test]
    fn test_load_source_files_empty_is_ok() {
        let tmp = TempDir::new().unwrap();
        let docs = load_source_files(tmp.path(), &["md"], &ParseOptions::default()).unwrap();
        assert!(docs.is_empty());
    }
}
