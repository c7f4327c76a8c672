//! Custom tags: `<x-name attr="value">children</x-name>`.
//!
//! A custom tag is an HTML element whose name starts with `x-`. When the
//! Markdown renderer meets one in raw HTML, it looks up the handler
//! registered for `name` and replaces the whole element with the handler's
//! output. Unknown tags and failing handlers become inline error markers.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};

use fm_core::error_inline_html;
use regex::Regex;

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<x-([A-Za-z0-9_-]+)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
    )
    .unwrap()
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// Error returned by a [`CustomTag`] handler.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TagError(pub String);

impl TagError {
    /// Create an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Arguments of one custom tag occurrence.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagArgs {
    /// Tag name without the `x-` prefix, lowercased.
    pub name: String,
    /// Attributes with entity-decoded values. Bare attributes are `""`.
    pub attrs: BTreeMap<String, String>,
    /// Raw text between the opening and closing tags, trimmed.
    pub children: String,
}

impl TagArgs {
    /// Attribute value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Handler rendering one custom tag to HTML.
///
/// # Example
///
/// ```
/// use fm_markdown::{CustomTag, TagArgs, TagError};
///
/// struct Youtube;
///
/// impl CustomTag for Youtube {
///     fn render(&self, args: &TagArgs) -> Result<String, TagError> {
///         let id = args.get("id").ok_or_else(|| TagError::new("id is required"))?;
///         Ok(format!("<iframe src=\"https://www.youtube.com/embed/{id}\"></iframe>\n"))
///     }
/// }
/// ```
pub trait CustomTag: Send + Sync {
    /// Render the tag.
    fn render(&self, args: &TagArgs) -> Result<String, TagError>;
}

impl<F> CustomTag for F
where
    F: Fn(&TagArgs) -> Result<String, TagError> + Send + Sync,
{
    fn render(&self, args: &TagArgs) -> Result<String, TagError> {
        self(args)
    }
}

/// Custom tag handlers keyed by name (without `x-`).
#[derive(Clone, Default)]
pub struct CustomTags {
    tags: HashMap<String, Arc<dyn CustomTag>>,
}

impl CustomTags {
    /// Create an empty tag table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `<x-name>`.
    pub fn insert(&mut self, name: impl Into<String>, tag: impl CustomTag + 'static) {
        self.tags
            .insert(name.into().to_lowercase(), Arc::new(tag));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, tag: impl CustomTag + 'static) -> Self {
        self.insert(name, tag);
        self
    }

    /// Whether no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Replace every custom tag in `html` with its rendered output.
    ///
    /// A tag that fills a whole line, or a whole `<p>` element, is a block
    /// tag: the wrapping paragraph is dropped and errors are rendered as
    /// block markers.
    #[must_use]
    pub fn expand(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut rest = html;

        while let Some(caps) = OPEN_TAG.captures(rest) {
            let (Some(whole), Some(raw_name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            out.push_str(&rest[..whole.start()]);

            let name = raw_name.as_str();
            let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
            let after = &rest[whole.end()..];
            let (children, mut remaining) = if self_closing {
                ("", after)
            } else {
                let closing = format!("</x-{name}>");
                match after.find(&closing) {
                    Some(end) => (&after[..end], &after[end + closing.len()..]),
                    None => ("", after),
                }
            };

            let block = if out.ends_with("<p>") && remaining.starts_with("</p>") {
                out.truncate(out.len() - "<p>".len());
                remaining = &remaining["</p>".len()..];
                true
            } else {
                (out.is_empty() || out.ends_with('\n'))
                    && (remaining.is_empty() || remaining.starts_with('\n'))
            };

            let args = TagArgs {
                name: name.to_lowercase(),
                attrs: parse_attributes(caps.get(2).map_or("", |m| m.as_str())),
                children: children.trim().to_owned(),
            };
            out.push_str(&self.render_tag(&args, block));
            rest = remaining;
        }

        out.push_str(rest);
        out
    }

    fn render_tag(&self, args: &TagArgs, block: bool) -> String {
        let Some(tag) = self.tags.get(&args.name) else {
            tracing::warn!(tag = %args.name, "Custom tag is not defined");
            return error_inline_html(
                &format!("Custom tag \"{}\" is not defined.", args.name),
                block,
            );
        };
        match tag.render(args) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(tag = %args.name, error = %e, "Custom tag failed");
                error_inline_html(
                    &format!("Error while rendering custom tag \"{}\": {e}", args.name),
                    block,
                )
            }
        }
    }
}

impl std::fmt::Debug for CustomTags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.tags.keys().collect();
        names.sort();
        f.debug_struct("CustomTags").field("tags", &names).finish()
    }
}

fn parse_attributes(s: &str) -> BTreeMap<String, String> {
    ATTRIBUTE
        .captures_iter(s)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().to_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            Some((name, decode_entities(value)))
        })
        .collect()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(CustomTags: Send, Sync);

    fn foo(args: &TagArgs) -> Result<String, TagError> {
        Ok(format!("<div>baz {}</div>", args.get("bar").unwrap_or_default()))
    }

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#" bar="1" baz='two words' qux=3 flag Title="&quot;x&quot;""#);
        assert_eq!(attrs.get("bar").map(String::as_str), Some("1"));
        assert_eq!(attrs.get("baz").map(String::as_str), Some("two words"));
        assert_eq!(attrs.get("qux").map(String::as_str), Some("3"));
        assert_eq!(attrs.get("flag").map(String::as_str), Some(""));
        assert_eq!(attrs.get("title").map(String::as_str), Some("\"x\""));
    }

    #[test]
    fn test_expand_paired_tag() {
        let tags = CustomTags::new().with("foo", foo);
        assert_eq!(
            tags.expand(r#"<x-foo bar="42"></x-foo>"#),
            "<div>baz 42</div>"
        );
    }

    #[test]
    fn test_expand_self_closing_tag_keeps_surroundings() {
        let tags = CustomTags::new().with("foo", foo);
        assert_eq!(
            tags.expand(r#"<p>before <x-foo bar="1"/> after</p>"#),
            "<p>before <div>baz 1</div> after</p>"
        );
    }

    #[test]
    fn test_expand_children() {
        let tags = CustomTags::new().with("quote", |args: &TagArgs| -> Result<String, TagError> {
            Ok(format!("<blockquote>{}</blockquote>", args.children))
        });
        assert_eq!(
            tags.expand("<x-quote>\n  Hello *world*\n</x-quote>"),
            "<blockquote>Hello *world*</blockquote>"
        );
    }

    #[test]
    fn test_expand_multiple_tags() {
        let tags = CustomTags::new().with("foo", foo);
        assert_eq!(
            tags.expand(r#"<x-foo bar="a"/><x-foo bar="b"></x-foo>"#),
            "<div>baz a</div><div>baz b</div>"
        );
    }

    #[test]
    fn test_unknown_tag_renders_error_marker() {
        let tags = CustomTags::new().with("notfoo", foo);
        let html = tags.expand("<x-foo></x-foo>");
        assert_eq!(
            html,
            r#"<p><b style="color:#c00; font-family:Helvetica">Custom tag &quot;foo&quot; is not defined.</b></p>"#
        );
    }

    #[test]
    fn test_failing_tag_renders_error_marker() {
        let tags = CustomTags::new().with("foo", |_: &TagArgs| -> Result<String, TagError> {
            Err(TagError::new("noooo"))
        });
        let html = tags.expand("<p>Look: <x-foo/></p>");
        assert!(html.starts_with("<p>Look: <b style="));
        assert!(html.contains("noooo"));
    }

    #[test]
    fn test_plain_html_untouched() {
        let tags = CustomTags::new();
        let html = r#"<div class="x"><xfoo></xfoo></div>"#;
        assert_eq!(tags.expand(html), html);
    }
}
