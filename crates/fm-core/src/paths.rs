//! Path and URL transforms.
//!
//! Source paths are always relative, `/`-separated strings (e.g.
//! `"ru/markdown.md"`), never filesystem paths, so these helpers work on
//! `&str`.

/// Strip the trailing `.ext` from a path.
///
/// Only a final dot followed by one or more word characters counts as an
/// extension, so `"a.b/c"` and `"file."` are returned unchanged.
///
/// ```
/// assert_eq!(fm_core::remove_extension("ru/markdown.md"), "ru/markdown");
/// assert_eq!(fm_core::remove_extension("README"), "README");
/// ```
#[must_use]
pub fn remove_extension(path: &str) -> &str {
    match path.rfind('.') {
        Some(dot) if is_word(&path[dot + 1..]) => &path[..dot],
        _ => path,
    }
}

/// Extension of the last path segment, without the dot.
///
/// Returns an empty string when there is none. Dot files such as
/// `".gitignore"` have no extension.
#[must_use]
pub fn get_extension(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[dot + 1..],
        _ => "",
    }
}

/// Convert a source path into the URL of its page.
///
/// The extension is dropped and a trailing `index` segment collapses into its
/// folder: `"a/b.md"` is `/a/b`, `"a/index.md"` is `/a` and `"index.md"` is
/// `/`.
#[must_use]
pub fn filepath_to_url(path: &str) -> String {
    let url = format!("/{}", remove_extension(path));
    let url = url.strip_suffix("/index").unwrap_or(&url);
    if url.is_empty() {
        "/".to_owned()
    } else {
        url.to_owned()
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_extension() {
        assert_eq!(remove_extension("ru/markdown.md"), "ru/markdown");
        assert_eq!(remove_extension("index.html"), "index");
        assert_eq!(remove_extension("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn test_remove_extension_without_extension() {
        assert_eq!(remove_extension("README"), "README");
        assert_eq!(remove_extension("a.b/c"), "a.b/c");
        assert_eq!(remove_extension("file."), "file.");
        assert_eq!(remove_extension(""), "");
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension("ru/markdown.md"), "md");
        assert_eq!(get_extension("feed.xml"), "xml");
        assert_eq!(get_extension("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_get_extension_none() {
        assert_eq!(get_extension("post"), "");
        assert_eq!(get_extension("a.b/c"), "");
        assert_eq!(get_extension(".gitignore"), "");
        assert_eq!(get_extension("file."), "");
    }

    #[test]
    fn test_filepath_to_url() {
        assert_eq!(filepath_to_url("a/b.md"), "/a/b");
        assert_eq!(filepath_to_url("a/index.md"), "/a");
        assert_eq!(filepath_to_url("index.md"), "/");
        assert_eq!(filepath_to_url("en/posts/hello.html"), "/en/posts/hello");
    }

    #[test]
    fn test_filepath_to_url_is_stable() {
        for path in ["index.md", "a/index.md", "a/b.md", "noext"] {
            assert_eq!(filepath_to_url(path), filepath_to_url(path));
        }
    }

    #[test]
    fn test_filepath_to_url_keeps_index_prefix_names() {
        assert_eq!(filepath_to_url("reindex.md"), "/reindex");
        assert_eq!(filepath_to_url("a/indexes.md"), "/a/indexes");
    }
}
