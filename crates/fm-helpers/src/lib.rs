//! Template helper functions.
//!
//! [`default_helpers`] returns the helper set every page context receives:
//!
//! | Name | Returns |
//! |------|---------|
//! | `option(key)` | config option for the page language, dotted keys allowed |
//! | `pageLang()` | page `lang` or the `lang` option |
//! | `__(key, params)` | localized string with `{name}` substitutions |
//! | `getPageTitle(options)` | `<title>` text with the site title suffix |
//! | `dateToString(date)` | date formatted with the `dateFormat` option |
//! | `absolutizeUrl(url)` | URL prefixed with the site `url` option |
//! | `absolutizeLinks(html)` | HTML with root-relative links made absolute |
//! | `isHome()` | whether the page URL is `/` |
//! | `assetFilepath(url)` | path of a static file under `assetsFolder` |
//! | `fingerprint(url)` | `url?hash` for cache busting |
//! | `embedFile(url)` | static file content |
//! | `inlineFile(url)` | static file content with a `/*name*/` comment |
//! | `json(value)` | JSON text |
//! | `meta(name, content)` / `og(name, content)` | meta tags |
//!
//! Helpers are context-bound: they read `lang`, `url` and `config` from the
//! context of the page being rendered.

mod args;
mod assets;
mod dates;
mod markup;
mod options;
mod urls;

use std::sync::Arc;

use fm_core::{HelperError, Helpers, RenderContext};
use serde_json::Value;

pub use assets::{AssetFiles, asset_filepath};
pub use dates::{DEFAULT_DATE_FORMAT, date_to_string};
pub use markup::{meta, og};
pub use options::{option, page_lang, page_title, translate};
pub use urls::{absolutize_links, absolutize_url, is_home};

/// Helpers available to every template.
///
/// Asset reads are memoized across all pages rendered with the returned set.
#[must_use]
pub fn default_helpers() -> Helpers {
    let assets = Arc::new(AssetFiles::new());

    Helpers::new()
        .with("option", options::option_helper)
        .with("pageLang", options::page_lang_helper)
        .with("__", options::translate_helper)
        .with("getPageTitle", options::page_title_helper)
        .with("dateToString", dates::date_to_string_helper)
        .with("absolutizeUrl", urls::absolutize_url_helper)
        .with("absolutizeLinks", urls::absolutize_links_helper)
        .with("isHome", urls::is_home_helper)
        .with("assetFilepath", assets::asset_filepath_helper)
        .with("fingerprint", asset_helper(&assets, "fingerprint", AssetFiles::fingerprint))
        .with("embedFile", asset_helper(&assets, "embedFile", AssetFiles::embed))
        .with("inlineFile", asset_helper(&assets, "inlineFile", AssetFiles::inline))
        .with("json", markup::json_helper)
        .with("meta", markup::meta_helper)
        .with("og", markup::og_helper)
}

type AssetFn = fn(&AssetFiles, &RenderContext, &str) -> Result<String, HelperError>;

fn asset_helper(
    assets: &Arc<AssetFiles>,
    name: &'static str,
    method: AssetFn,
) -> impl Fn(&RenderContext, &[Value]) -> Result<Value, HelperError> + Send + Sync + 'static {
    let assets = Arc::clone(assets);
    move |ctx: &RenderContext, args: &[Value]| {
        let url = args::string(name, args, 0)?;
        method(&assets, ctx, &url).map(Value::from)
    }
}
