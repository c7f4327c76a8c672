//! RSS 2.0 feed rendering.
//!
//! A feed page is an ordinary document whose layout is [`FEED_LAYOUT`].
//! Its fields describe the channel:
//!
//! | Field | Required | Meaning |
//! |-------|----------|---------|
//! | `title` | yes | channel title |
//! | `description` | yes | channel description |
//! | `items` | yes | list of `{title, url, description, excerpt or content, date, author}` |
//! | `feedUrl` | no | feed URL, defaults to `url + ".xml"` |
//! | `siteUrl` | no | channel link, defaults to the site root |
//! | `imageUrl` | no | channel image |
//! | `lang` | no | channel language |
//!
//! A listing page has no `items`: its `documents` are used instead, so a
//! `[[listings]]` entry with the `rss.xml` layout produces a feed of the
//! listed documents.
//!
//! URLs are made absolute with the `absolutizeUrl` helper and item
//! descriptions go through `absolutizeLinks`, both taken from the render
//! context. A feed that cannot be built renders as an error page instead of
//! failing the build.

use fm_core::{HelperError, RenderContext, error_html, parse_date};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};

/// Layout name that selects the feed renderer.
pub const FEED_LAYOUT: &str = "rss.xml";

const GENERATOR: &str = "fledermaus";
const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
const REQUIRED: [&str; 2] = ["title", "description"];
const ITEMS: &str = "items";
const DOCUMENTS: &str = "documents";

/// Error building a feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// A required context value is missing or empty.
    #[error("missing required property \"{0}\".")]
    MissingProperty(&'static str),
    /// A URL helper failed.
    #[error(transparent)]
    Helper(#[from] HelperError),
    /// XML serialization failed.
    #[error("Cannot write XML: {0}")]
    Write(#[from] std::io::Error),
}

/// Render the feed of `ctx` as RSS XML, or as an error page.
pub fn render_feed(ctx: &RenderContext) -> String {
    match build_feed(ctx) {
        Ok(xml) => xml,
        Err(e) => {
            let source_path = ctx.str_value("sourcePath").unwrap_or_default();
            tracing::warn!(source = source_path, error = %e, "Cannot render RSS feed");
            error_html(&format!(
                "Error while rendering an RSS feed {source_path}: {e}"
            ))
        }
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn absolutize_url(ctx: &RenderContext, url: &str) -> Result<String, HelperError> {
    let value = ctx.call("absolutizeUrl", &[Value::from(url)])?;
    Ok(text(Some(&value)).unwrap_or_default())
}

fn absolutize_links(ctx: &RenderContext, html: &str) -> Result<String, HelperError> {
    let value = ctx.call("absolutizeLinks", &[Value::from(html)])?;
    Ok(text(Some(&value)).unwrap_or_default())
}

/// Channel and items with every URL resolved.
struct Feed {
    title: String,
    description: String,
    site_url: String,
    feed_url: String,
    image_url: Option<String>,
    language: Option<String>,
    items: Vec<FeedItem>,
}

struct FeedItem {
    title: String,
    url: Option<String>,
    description: Option<String>,
    date: Option<String>,
    author: Option<String>,
}

fn build_feed(ctx: &RenderContext) -> Result<String, FeedError> {
    for prop in REQUIRED {
        if ctx.value(prop).is_none_or(is_empty) {
            return Err(FeedError::MissingProperty(prop));
        }
    }
    let items = ctx
        .value(ITEMS)
        .filter(|items| !is_empty(items))
        .or_else(|| ctx.value(DOCUMENTS))
        .filter(|items| !is_empty(items))
        .ok_or(FeedError::MissingProperty(ITEMS))?;

    let feed_url = match ctx.str_value("feedUrl").filter(|s| !s.is_empty()) {
        Some(url) => url.to_owned(),
        None => format!("{}.xml", ctx.url().unwrap_or_default()),
    };
    let items = match items {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| feed_item(ctx, item))
            .collect::<Result<_, _>>()?,
        _ => Vec::new(),
    };

    let feed = Feed {
        title: text(ctx.value("title")).unwrap_or_default(),
        description: text(ctx.value("description")).unwrap_or_default(),
        site_url: absolutize_url(ctx, ctx.str_value("siteUrl").unwrap_or_default())?,
        feed_url: absolutize_url(ctx, &feed_url)?,
        image_url: ctx
            .str_value("imageUrl")
            .filter(|s| !s.is_empty())
            .map(|url| absolutize_url(ctx, url))
            .transpose()?,
        language: ctx.lang().map(str::to_owned),
        items,
    };
    Ok(write_feed(&feed)?)
}

fn feed_item(ctx: &RenderContext, item: &Map<String, Value>) -> Result<FeedItem, HelperError> {
    let description = ["description", "excerpt", "content"]
        .into_iter()
        .find_map(|field| text(item.get(field)));
    Ok(FeedItem {
        title: text(item.get("title")).unwrap_or_default(),
        url: text(item.get("url"))
            .map(|url| absolutize_url(ctx, &url))
            .transpose()?,
        description: description
            .map(|html| absolutize_links(ctx, &html))
            .transpose()?,
        date: text(item.get("date")).map(|date| rfc822_date(&date)),
        author: text(item.get("author")),
    })
}

fn element<W: std::io::Write>(writer: &mut Writer<W>, name: &str, value: &str) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn write_feed(feed: &Feed) -> std::io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0"), ("xmlns:atom", ATOM_NAMESPACE)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    element(&mut writer, "title", &feed.title)?;
    element(&mut writer, "description", &feed.description)?;
    element(&mut writer, "link", &feed.site_url)?;
    writer.write_event(Event::Empty(BytesStart::new("atom:link").with_attributes([
        ("href", feed.feed_url.as_str()),
        ("rel", "self"),
        ("type", "application/rss+xml"),
    ])))?;
    if let Some(image_url) = &feed.image_url {
        writer.write_event(Event::Start(BytesStart::new("image")))?;
        element(&mut writer, "url", image_url)?;
        element(&mut writer, "title", &feed.title)?;
        element(&mut writer, "link", &feed.site_url)?;
        writer.write_event(Event::End(BytesEnd::new("image")))?;
    }
    if let Some(language) = &feed.language {
        element(&mut writer, "language", language)?;
    }
    element(&mut writer, "generator", GENERATOR)?;

    for item in &feed.items {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        element(&mut writer, "title", &item.title)?;
        if let Some(url) = &item.url {
            element(&mut writer, "link", url)?;
            writer.write_event(Event::Start(
                BytesStart::new("guid").with_attributes([("isPermaLink", "true")]),
            ))?;
            writer.write_event(Event::Text(BytesText::new(url)))?;
            writer.write_event(Event::End(BytesEnd::new("guid")))?;
        }
        if let Some(description) = &item.description {
            element(&mut writer, "description", description)?;
        }
        if let Some(author) = &item.author {
            element(&mut writer, "author", author)?;
        }
        if let Some(date) = &item.date {
            element(&mut writer, "pubDate", date)?;
        }
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut xml = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    xml.push('\n');
    Ok(xml)
}

const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format an ISO date (`2015-10-22` or `2015-10-22T20:07:22`) as an RFC 822
/// date. Other strings, impossible dates included, are returned unchanged.
fn rfc822_date(date: &str) -> String {
    parse_date(date).map_or_else(
        || date.to_owned(),
        |date| date.format(RFC822_FORMAT).to_string(),
    )
}
