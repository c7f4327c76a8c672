//! Document parser: front matter, content rendering, cut tag and custom
//! field parsers combined into one [`Document`].

use serde_json::Value;

use crate::document::{CONTENT, Document, EXCERPT, MORE, SOURCE_PATH, URL};
use crate::frontmatter::split_front_matter;
use crate::paths::filepath_to_url;
use crate::render::{RendererTable, render_by_type};

type FieldParserFn = dyn Fn(Option<&Value>, &Document) -> Value + Send + Sync;

/// Custom field post-processors, applied in declaration order.
///
/// Each parser receives the current value of its field (if any) and the
/// document as it was before any custom parser ran. Its result replaces the
/// field value.
#[derive(Default)]
pub struct FieldParsers {
    parsers: Vec<(String, Box<FieldParserFn>)>,
}

impl FieldParsers {
    /// Create an empty parser list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parser for `field`.
    pub fn insert<F>(&mut self, field: impl Into<String>, parser: F)
    where
        F: Fn(Option<&Value>, &Document) -> Value + Send + Sync + 'static,
    {
        self.parsers.push((field.into(), Box::new(parser)));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with<F>(mut self, field: impl Into<String>, parser: F) -> Self
    where
        F: Fn(Option<&Value>, &Document) -> Value + Send + Sync + 'static,
    {
        self.insert(field, parser);
        self
    }

    /// Whether no parsers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Apply all parsers to `document`.
    #[must_use]
    pub fn apply(&self, document: Document) -> Document {
        if self.parsers.is_empty() {
            return document;
        }
        let parsed: Vec<(String, Value)> = self
            .parsers
            .iter()
            .map(|(field, parser)| (field.clone(), parser(document.get(field), &document)))
            .collect();

        let mut document = document;
        for (field, value) in parsed {
            document.insert(field, value);
        }
        document
    }
}

impl std::fmt::Debug for FieldParsers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.parsers.iter().map(|(field, _)| field))
            .finish()
    }
}

/// Options for [`parse_page`].
#[derive(Debug, Default)]
pub struct ParseOptions {
    /// Content renderers keyed by source extension.
    pub renderers: RendererTable,
    /// Custom field parsers.
    pub field_parsers: FieldParsers,
    /// Marker splitting content into `excerpt` and `more`.
    pub cut_tag: Option<String>,
}

/// Parse one source file into a [`Document`].
///
/// `filepath` is the path relative to the source folder. It is stored as
/// `sourcePath` and used to derive `url` and to pick the content renderer.
/// Reserved fields win over front matter fields of the same name.
pub fn parse_page(source: &str, filepath: &str, options: &ParseOptions) -> Document {
    let front_matter = split_front_matter(source);
    let url = filepath_to_url(filepath);
    let content = render_by_type(front_matter.body, filepath, &options.renderers);

    let mut document = Document::from(front_matter.attributes);
    document.remove(EXCERPT);
    document.remove(MORE);

    if let Some((excerpt, more)) = options
        .cut_tag
        .as_deref()
        .filter(|tag| !tag.is_empty())
        .and_then(|tag| content.split_once(tag))
    {
        document.insert(EXCERPT, excerpt);
        document.insert(MORE, more);
    }

    document.insert(SOURCE_PATH, filepath);
    document.insert(CONTENT, content);
    document.insert(URL, url);

    options.field_parsers.apply(document)
}
