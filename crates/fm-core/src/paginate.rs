//! Pagination of document lists into synthetic listing documents.

use serde_json::{Map, Value};

use crate::document::{Document, LAYOUT, SOURCE_PATH, URL};

/// Error returned by [`paginate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginateError {
    /// A required option is missing or empty.
    #[error("\"{0}\" not specified for paginate()")]
    MissingArgument(&'static str),
}

/// Options for [`paginate`].
///
/// `source_path_prefix`, `url_prefix`, `documents_per_page` and `layout` are
/// required. They are `Option`s so a missing one is reported by name.
#[derive(Debug, Clone, Default)]
pub struct PaginateOptions {
    /// Source path of the first page (e.g. `"en/all"`).
    pub source_path_prefix: Option<String>,
    /// URL of the first page (e.g. `"/en/all"`).
    pub url_prefix: Option<String>,
    /// Documents on each page. Zero counts as missing.
    pub documents_per_page: Option<usize>,
    /// Layout of every generated page.
    pub layout: Option<String>,
    /// Append `/index` to the first page's source path.
    pub index: bool,
    /// Fields copied into every page; generated fields win on conflict.
    pub extra: Map<String, Value>,
}

/// URL (or source path) of page `page_number` of a listing.
///
/// Page 1 is `url_prefix` itself (`url_prefix/index` with `index`); page N
/// is `url_prefix/page/N`. Repeated slashes are collapsed, so a `"/"`
/// prefix gives `"/page/2"`.
#[must_use]
pub fn get_page_number_url(url_prefix: &str, page_number: usize, index: bool) -> String {
    let url = if page_number == 1 {
        if index {
            format!("{url_prefix}/index")
        } else {
            url_prefix.to_owned()
        }
    } else {
        format!("{url_prefix}/page/{page_number}")
    };
    collapse_slashes(&url)
}

/// Split `documents` into listing pages of `documents_per_page` each.
///
/// Every page is a synthetic [`Document`] with `previousUrl`/`nextUrl`
/// (`null` at the ends), its slice as `documents`, `documentsTotal`,
/// `sourcePath`, `layout` and `url`. No documents means no pages.
pub fn paginate(
    documents: &[Document],
    options: &PaginateOptions,
) -> Result<Vec<Document>, PaginateError> {
    let source_path_prefix =
        required_str(options.source_path_prefix.as_deref(), "sourcePathPrefix")?;
    let url_prefix = required_str(options.url_prefix.as_deref(), "urlPrefix")?;
    let per_page = options
        .documents_per_page
        .filter(|n| *n > 0)
        .ok_or(PaginateError::MissingArgument("documentsPerPage"))?;
    let layout = required_str(options.layout.as_deref(), "layout")?;

    let total_pages = documents.len().div_ceil(per_page);

    let pages = documents
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| {
            let page_number = i + 1;
            let previous_url = (page_number > 1)
                .then(|| get_page_number_url(url_prefix, page_number - 1, false));
            let next_url = (page_number < total_pages)
                .then(|| get_page_number_url(url_prefix, page_number + 1, false));

            let mut page = Document::from(options.extra.clone());
            page.insert("previousUrl", previous_url);
            page.insert("nextUrl", next_url);
            page.insert(
                "documents",
                chunk.iter().map(Document::to_value).collect::<Vec<_>>(),
            );
            page.insert("documentsTotal", documents.len());
            page.insert(
                SOURCE_PATH,
                get_page_number_url(source_path_prefix, page_number, options.index),
            );
            page.insert(LAYOUT, layout);
            page.insert(URL, get_page_number_url(url_prefix, page_number, false));
            page
        })
        .collect();

    Ok(pages)
}

fn required_str<'a>(
    value: Option<&'a str>,
    name: &'static str,
) -> Result<&'a str, PaginateError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(PaginateError::MissingArgument(name))
}

fn collapse_slashes(url: &str) -> String {
    let mut result = String::with_capacity(url.len());
    for c in url.chars() {
        if c == '/' && result.ends_with('/') {
            continue;
        }
        result.push(c);
    }
    result
}
