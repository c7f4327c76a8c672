//! Page generation: document + context + template renderer -> page.

use serde_json::Value;

use crate::context::{Helpers, RenderContext, make_context};
use crate::document::Document;
use crate::paths::{get_extension, remove_extension};

/// Output extension for layouts without one.
const DEFAULT_PAGE_EXTENSION: &str = "html";

/// Error returned by a [`TemplateRenderer`].
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template with this name.
    #[error("Template not found: {0}")]
    NotFound(String),
    /// The template failed to render.
    #[error("Cannot render template {template}: {message}")]
    Render {
        /// Template name.
        template: String,
        /// Renderer error message.
        message: String,
    },
}

/// Renders a named template with a context.
///
/// `template` is the document's `layout` (e.g. `"post"` or `"feed.xml"`).
/// How it maps onto template files is up to the implementation.
pub trait TemplateRenderer {
    /// Render `template` with `ctx`.
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, TemplateError>;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&str, &RenderContext) -> Result<String, TemplateError>,
{
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, TemplateError> {
        self(template, ctx)
    }
}

/// Error returned by [`generate_page`].
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The document has no `sourcePath`.
    #[error("Source path not specified. Add \"sourcePath\" front matter field.")]
    MissingSourcePath,
    /// The document has no `layout`.
    #[error("Layout not specified for {0}. Add \"layout\" front matter field.")]
    MissingLayout(String),
    /// The template renderer failed.
    #[error("Cannot generate {source_path}: {source}")]
    Template {
        /// Source path of the document.
        source_path: String,
        /// Renderer error.
        source: TemplateError,
    },
}

/// One generated output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Output path relative to the output folder (e.g. `"en/post.html"`).
    pub page_path: String,
    /// Rendered content.
    pub content: String,
}

/// Generate the page of one document.
///
/// The output extension is the layout's extension, or `html` when the
/// layout has none, so layout `feed.xml` turns `all/feed.md` into
/// `all/feed.xml`. Missing `sourcePath` or `layout` fails before the
/// renderer is called.
pub fn generate_page(
    document: &Document,
    config: &Value,
    helpers: &Helpers,
    renderer: &dyn TemplateRenderer,
) -> Result<Page, GenerateError> {
    let source_path = document
        .source_path()
        .ok_or(GenerateError::MissingSourcePath)?;
    let layout = document
        .layout()
        .filter(|layout| !layout.is_empty())
        .ok_or_else(|| GenerateError::MissingLayout(source_path.to_owned()))?;

    let ctx = make_context(document, config, helpers);

    let content = renderer
        .render(layout, &ctx)
        .map_err(|source| GenerateError::Template {
            source_path: source_path.to_owned(),
            source,
        })?;

    let extension = match get_extension(layout) {
        "" => DEFAULT_PAGE_EXTENSION,
        extension => extension,
    };
    let page_path = format!("{}.{extension}", remove_extension(source_path));

    tracing::debug!(source = source_path, page = %page_path, "Generated page");
    Ok(Page { page_path, content })
}

/// Generate pages for all documents, in order.
///
/// The first failing document aborts the whole batch.
pub fn generate_pages(
    documents: &[Document],
    config: &Value,
    helpers: &Helpers,
    renderer: &dyn TemplateRenderer,
) -> Result<Vec<Page>, GenerateError> {
    documents
        .iter()
        .map(|document| generate_page(document, config, helpers, renderer))
        .collect()
}
