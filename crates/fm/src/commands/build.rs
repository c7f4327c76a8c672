//! `fm build` command implementation.

use std::path::PathBuf;

use clap::Args;
use fm_cache::{Cache, JsonFileCache, NullCache};
use fm_config::{CliSettings, ListingSettings, Settings, load_config};
use fm_core::{
    Criteria, Criterion, Document, FieldParsers, GroupBy, PaginateOptions, ParseOptions,
    RendererTable, filter_documents, generate_pages, group_documents, load_source_files,
    order_documents, paginate, save_pages_with_cache,
};
use fm_helpers::default_helpers;
use fm_markdown::{Highlighter, MarkdownRenderer};
use fm_template::JinjaRenderer;
use serde_json::Value;

use crate::error::CliError;
use crate::output::Output;

/// Page cache version. A new release invalidates pages cached by older ones.
const CACHE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Field set on per-group listing pages to the group value (e.g. the tag).
const GROUP_FIELD: &str = "group";

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Source directory (overrides settings).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory (overrides settings).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write every page even if it did not change.
    #[arg(long)]
    no_cache: bool,

    /// Path to settings file (default: auto-discover fledermaus.toml).
    #[arg(short, long, env = "FLEDERMAUS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            cache_enabled: self.no_cache.then_some(false),
        };
        let settings = Settings::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!("Source: {}", settings.paths.source_dir.display()));
        output.info(&format!("Output: {}", settings.paths.output_dir.display()));

        let report = build_site(&settings)?;

        if report.documents == 0 {
            output.warning("No source files found");
        }
        output.success(&format!(
            "Built {} pages ({} written, {} unchanged)",
            report.pages, report.written, report.unchanged
        ));
        Ok(())
    }
}

/// Numbers reported after a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BuildReport {
    /// Source documents loaded.
    pub(crate) documents: usize,
    /// Pages generated, listings included.
    pub(crate) pages: usize,
    /// Pages written to disk.
    pub(crate) written: usize,
    /// Pages left untouched because their content did not change.
    pub(crate) unchanged: usize,
}

/// Run the whole pipeline: load, list, generate, save.
pub(crate) fn build_site(settings: &Settings) -> Result<BuildReport, CliError> {
    let paths = &settings.paths;

    let config = load_config(&paths.config_dir)?.to_value();

    let mut markdown = MarkdownRenderer::new();
    if settings.content.highlight {
        markdown = markdown
            .with_highlighter(Highlighter::with_theme(&settings.content.highlight_theme));
    }
    let options = ParseOptions {
        renderers: RendererTable::new().with("md", markdown),
        field_parsers: FieldParsers::new(),
        cut_tag: settings.content.cut_tag.clone(),
    };
    let documents = load_source_files(&paths.source_dir, &settings.content.extensions, &options)?;
    tracing::info!(count = documents.len(), "Loaded source files");

    let mut pages_to_render: Vec<Document> = documents
        .iter()
        .filter(|document| {
            let has_layout = document.layout().is_some_and(|layout| !layout.is_empty());
            if !has_layout {
                tracing::debug!(
                    source = document.source_path().unwrap_or_default(),
                    "Skipping document without layout"
                );
            }
            has_layout
        })
        .cloned()
        .collect();

    for listing in &settings.listings {
        let listing_pages =
            listing_documents(&documents, listing).map_err(|source| CliError::Listing {
                listing: listing.source_path_prefix.clone(),
                source,
            })?;
        tracing::info!(
            listing = %listing.source_path_prefix,
            pages = listing_pages.len(),
            "Generated listing"
        );
        pages_to_render.extend(listing_pages);
    }

    let renderer = JinjaRenderer::new(&paths.templates_dir);
    let pages = generate_pages(&pages_to_render, &config, &default_helpers(), &renderer)?;

    let mut cache: Box<dyn Cache> = if paths.cache_enabled {
        Box::new(JsonFileCache::open(paths.cache_file.clone(), CACHE_VERSION))
    } else {
        Box::new(NullCache)
    };
    let stats = save_pages_with_cache(&pages, &paths.output_dir, cache.as_mut())?;
    cache.flush()?;

    Ok(BuildReport {
        documents: documents.len(),
        pages: pages.len(),
        written: stats.written,
        unchanged: stats.unchanged,
    })
}

/// Listing pages for one `[[listings]]` entry.
///
/// With `group_by`, every group value gets its own paginated listing under
/// `<prefix>/<value>`, with the value stored in the `group` field.
fn listing_documents(
    documents: &[Document],
    listing: &ListingSettings,
) -> Result<Vec<Document>, fm_core::PaginateError> {
    let criteria: Criteria = listing
        .filter
        .iter()
        .map(|(field, value)| (field.clone(), Criterion::from(value.clone())))
        .collect();
    let selected = order_documents(&filter_documents(documents, &criteria), &listing.order);

    let Some(group_by) = &listing.group_by else {
        return paginate(
            &selected,
            &paginate_options(listing, &listing.source_path_prefix, &listing.url_prefix, None),
        );
    };

    let mut pages = Vec::new();
    for (group, members) in group_documents(&selected, &GroupBy::field(group_by.as_str())) {
        let options = paginate_options(
            listing,
            &format!("{}/{group}", listing.source_path_prefix),
            &format!("{}/{group}", listing.url_prefix),
            Some(&group),
        );
        pages.extend(paginate(&members, &options)?);
    }
    Ok(pages)
}

fn paginate_options(
    listing: &ListingSettings,
    source_path_prefix: &str,
    url_prefix: &str,
    group: Option<&str>,
) -> PaginateOptions {
    let mut extra: serde_json::Map<String, Value> = listing
        .extra
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if let Some(group) = group {
        extra.insert(GROUP_FIELD.to_owned(), Value::from(group));
    }

    PaginateOptions {
        source_path_prefix: Some(source_path_prefix.to_owned()),
        url_prefix: Some(url_prefix.to_owned()),
        documents_per_page: Some(listing.documents_per_page),
        layout: Some(listing.layout.clone()),
        index: listing.index,
        extra,
    }
}
