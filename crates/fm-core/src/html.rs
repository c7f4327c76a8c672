//! HTML escaping and error markup shared by renderers.
//!
//! Renderers report recoverable problems (an unknown custom tag, a feed with
//! missing properties) inside the generated output instead of aborting the
//! build, so the author sees the error on the page itself.

const ERROR_STYLE: &str = "color:#c00; font-family:Helvetica";

/// Escape `&`, `<`, `>`, `"` and `'`.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an error message and turn line breaks into `<br>`.
#[must_use]
pub fn format_error_html(message: &str) -> String {
    escape_html(message).replace('\n', "<br>")
}

/// Inline error marker: a red bold message.
///
/// With `block`, the marker is wrapped in a paragraph.
#[must_use]
pub fn error_inline_html(message: &str, block: bool) -> String {
    let marker = format!(
        r#"<b style="{ERROR_STYLE}">{}</b>"#,
        format_error_html(message)
    );
    if block {
        format!("<p>{marker}</p>")
    } else {
        marker
    }
}

/// Standalone HTML error document, used in place of a whole page.
#[must_use]
pub fn error_html(message: &str) -> String {
    format!(
        "<title>Error</title>\n<body style=\"{ERROR_STYLE}\">\n<h1>Error</h1>\n<p>{}</p>\n</body>\n",
        format_error_html(message)
    )
}
