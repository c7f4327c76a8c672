//! Markdown content renderer with custom tags.
//!
//! [`MarkdownRenderer`] converts Markdown to HTML using pulldown-cmark with
//! GitHub Flavored Markdown extensions. Raw HTML elements named `x-*` are
//! custom tags and are replaced by the output of a registered [`CustomTag`]
//! handler. With a [`Highlighter`], fenced code blocks are syntax
//! highlighted.
//!
//! # Example
//!
//! ```
//! use fm_markdown::{CustomTags, MarkdownRenderer, TagArgs, TagError};
//!
//! let tags = CustomTags::new().with("badge", |args: &TagArgs| -> Result<String, TagError> {
//!     Ok(format!("<span class=\"badge\">{}</span>", args.get("text").unwrap_or_default()))
//! });
//! let renderer = MarkdownRenderer::new().with_tags(tags);
//!
//! let html = renderer.render("# Hello\n\nNew <x-badge text=\"beta\"/> feature");
//! assert_eq!(
//!     html,
//!     "<h1>Hello</h1>\n<p>New <span class=\"badge\">beta</span> feature</p>\n"
//! );
//! ```

mod highlight;
mod tags;

use std::sync::Arc;

use fm_core::ContentRenderer;
use pulldown_cmark::{Options, Parser, html};

pub use highlight::{DEFAULT_THEME, Highlighter};
pub use tags::{CustomTag, CustomTags, TagArgs, TagError};

/// Markdown to HTML renderer.
///
/// Headings are rendered without `id` attributes.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    tags: CustomTags,
    highlighter: Option<Arc<Highlighter>>,
    gfm: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with GFM enabled, no custom tags and no code
    /// highlighting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tags: CustomTags::new(),
            highlighter: None,
            gfm: true,
        }
    }

    /// Set custom tag handlers.
    #[must_use]
    pub fn with_tags(mut self, tags: CustomTags) -> Self {
        self.tags = tags;
        self
    }

    /// Highlight fenced code blocks.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Highlighter) -> Self {
        self.highlighter = Some(Arc::new(highlighter));
        self
    }

    /// Enable or disable GitHub Flavored Markdown (tables, strikethrough,
    /// task lists).
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options for the current configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render Markdown to HTML.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        match &self.highlighter {
            Some(highlighter) => {
                html::push_html(&mut output, highlighter.highlight_events(parser).into_iter());
            }
            None => html::push_html(&mut output, parser),
        }

        // Custom tags only survive as raw HTML; escaped text never contains `<x-`.
        if output.contains("<x-") {
            self.tags.expand(&output)
        } else {
            output
        }
    }
}

impl ContentRenderer for MarkdownRenderer {
    fn render(&self, source: &str) -> String {
        MarkdownRenderer::render(self, source)
    }
}
