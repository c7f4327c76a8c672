//! Site URL helpers.

use fm_core::{HelperError, RenderContext};
use serde_json::Value;

use crate::args;
use crate::options::option;

fn site_url(ctx: &RenderContext) -> Result<String, HelperError> {
    let url = args::display(&option(ctx, "url")?);
    Ok(url.strip_suffix('/').unwrap_or(&url).to_owned())
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("//") || url.contains("://") || url.starts_with("mailto:")
}

/// Prefix a site-relative URL with the site `url` option.
///
/// Absolute URLs are returned unchanged.
pub fn absolutize_url(ctx: &RenderContext, url: &str) -> Result<String, HelperError> {
    if is_absolute(url) {
        return Ok(url.to_owned());
    }
    let path = url.strip_prefix('/').unwrap_or(url);
    Ok(format!("{}/{path}", site_url(ctx)?))
}

/// Make every root-relative `href` and `src` attribute in `html` absolute.
pub fn absolutize_links(ctx: &RenderContext, html: &str) -> Result<String, HelperError> {
    let base = site_url(ctx)?;
    Ok(html
        .replace("href=\"/", &format!("href=\"{base}/"))
        .replace("src=\"/", &format!("src=\"{base}/")))
}

/// Whether the page is the site home page.
pub fn is_home(ctx: &RenderContext) -> bool {
    ctx.url() == Some("/")
}

pub(crate) fn absolutize_url_helper(
    ctx: &RenderContext,
    args: &[Value],
) -> Result<Value, HelperError> {
    absolutize_url(ctx, &args::string("absolutizeUrl", args, 0)?).map(Value::from)
}

pub(crate) fn absolutize_links_helper(
    ctx: &RenderContext,
    args: &[Value],
) -> Result<Value, HelperError> {
    absolutize_links(ctx, &args::string("absolutizeLinks", args, 0)?).map(Value::from)
}

pub(crate) fn is_home_helper(ctx: &RenderContext, _args: &[Value]) -> Result<Value, HelperError> {
    Ok(Value::Bool(is_home(ctx)))
}
