//! Content pipeline for the fledermaus static site generator.
//!
//! A build threads one list of [`Document`]s through these stages:
//!
//! 1. [`load_source_files`]: find source files, split front matter, render
//!    content by extension ([`RendererTable`]), apply [`FieldParsers`].
//! 2. [`filter_documents`], [`order_documents`], [`group_documents`] and
//!    [`paginate`]: derive listing pages from the loaded documents.
//! 3. [`generate_pages`]: build a [`RenderContext`] per document (helpers,
//!    site `config`, document fields) and render its `layout` with a
//!    [`TemplateRenderer`].
//! 4. [`save_pages`] / [`save_pages_with_cache`]: write [`Page`]s to the
//!    output folder.
//!
//! # Example
//!
//! ```
//! use fm_core::{Document, Helpers, RenderContext, TemplateError, generate_page};
//! use serde_json::json;
//!
//! let document = Document::new()
//!     .with("sourcePath", "en/hello.md")
//!     .with("layout", "post")
//!     .with("title", "Hello");
//! let render = |_: &str, ctx: &RenderContext| -> Result<String, TemplateError> {
//!     Ok(format!("<h1>{}</h1>", ctx.str_value("title").unwrap_or_default()))
//! };
//!
//! let page = generate_page(&document, &json!({}), &Helpers::new(), &render).unwrap();
//! assert_eq!(page.page_path, "en/hello.html");
//! assert_eq!(page.content, "<h1>Hello</h1>");
//! ```

mod collections;
mod context;
mod dates;
mod document;
mod frontmatter;
mod generate;
mod html;
mod loader;
mod paginate;
mod parser;
mod paths;
mod render;
mod writer;

pub use collections::{
    Criteria, Criterion, GroupBy, SortField, filter_documents, group_documents, order_documents,
};
pub use context::{
    CONFIG, ContextEntry, Helper, HelperError, Helpers, RenderContext, make_context,
};
pub use dates::parse_date;
pub use document::{CONTENT, Document, EXCERPT, LANG, LAYOUT, MORE, SOURCE_PATH, URL};
pub use frontmatter::{FrontMatter, split_front_matter};
pub use generate::{
    GenerateError, Page, TemplateError, TemplateRenderer, generate_page, generate_pages,
};
pub use html::{error_html, error_inline_html, escape_html, format_error_html};
pub use loader::{LoadError, get_source_files_list, load_source_files};
pub use paginate::{PaginateError, PaginateOptions, get_page_number_url, paginate};
pub use parser::{FieldParsers, ParseOptions, parse_page};
pub use paths::{filepath_to_url, get_extension, remove_extension};
pub use render::{ContentRenderer, RendererTable, render_by_type};
pub use writer::{SaveStats, WriteError, save_page, save_pages, save_pages_with_cache};
