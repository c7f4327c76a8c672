//! Content renderer dispatch by file extension.

use std::collections::HashMap;

use crate::paths::get_extension;

/// Converts raw source text into rendered text (e.g. Markdown to HTML).
pub trait ContentRenderer: Send + Sync {
    /// Render `source`.
    fn render(&self, source: &str) -> String;
}

impl<F> ContentRenderer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn render(&self, source: &str) -> String {
        self(source)
    }
}

/// Content renderers keyed by source file extension (without the dot).
#[derive(Default)]
pub struct RendererTable {
    renderers: HashMap<String, Box<dyn ContentRenderer>>,
}

impl RendererTable {
    /// Create an empty table. Every file passes through unchanged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `renderer` for `extension`, replacing any previous one.
    pub fn insert(&mut self, extension: impl Into<String>, renderer: impl ContentRenderer + 'static) {
        self.renderers.insert(extension.into(), Box::new(renderer));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, extension: impl Into<String>, renderer: impl ContentRenderer + 'static) -> Self {
        self.insert(extension, renderer);
        self
    }

    /// Renderer registered for `extension`.
    #[must_use]
    pub fn get(&self, extension: &str) -> Option<&dyn ContentRenderer> {
        self.renderers.get(extension).map(|renderer| &**renderer)
    }
}

impl std::fmt::Debug for RendererTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut extensions: Vec<_> = self.renderers.keys().collect();
        extensions.sort();
        f.debug_struct("RendererTable")
            .field("extensions", &extensions)
            .finish()
    }
}

/// Render `source` with the renderer registered for the extension of
/// `filepath`.
///
/// Files without a matching renderer are returned unchanged.
pub fn render_by_type(source: &str, filepath: &str, renderers: &RendererTable) -> String {
    match renderers.get(get_extension(filepath)) {
        Some(renderer) => renderer.render(source),
        None => source.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(RendererTable: Send, Sync);

    fn upper(source: &str) -> String {
        source.to_uppercase()
    }

    #[test]
    fn test_render_by_type_uses_extension() {
        let renderers = RendererTable::new().with("md", upper);
        assert_eq!(render_by_type("hello", "posts/a.md", &renderers), "HELLO");
    }

    #[test]
    fn test_render_by_type_passthrough() {
        let renderers = RendererTable::new().with("md", upper);
        assert_eq!(render_by_type("<b>hi</b>", "a.html", &renderers), "<b>hi</b>");
        assert_eq!(render_by_type("plain", "README", &renderers), "plain");
    }

    #[test]
    fn test_render_by_type_with_closure() {
        let prefix = String::from("> ");
        let renderers =
            RendererTable::new().with("txt", move |s: &str| format!("{prefix}{s}"));
        assert_eq!(render_by_type("quote", "a.txt", &renderers), "> quote");
    }

    #[test]
    fn test_debug_lists_extensions() {
        let renderers = RendererTable::new().with("md", upper).with("html", upper);
        assert_eq!(
            format!("{renderers:?}"),
            r#"RendererTable { extensions: ["html", "md"] }"#
        );
    }
}
