//! HTML snippets: `meta`, `og` and `json`.

use std::sync::LazyLock;

use fm_core::{HelperError, RenderContext, escape_html};
use regex::Regex;
use serde_json::Value;

use crate::args;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

fn attribute(content: &str) -> String {
    escape_html(&TAG.replace_all(content, ""))
}

/// `<meta name="..." content="...">` with tags stripped from `content`.
pub fn meta(name: &str, content: &str) -> String {
    format!(
        r#"<meta name="{}" content="{}">"#,
        escape_html(name),
        attribute(content)
    )
}

/// Open Graph `<meta property="..." content="...">`.
pub fn og(name: &str, content: &str) -> String {
    format!(
        r#"<meta property="{}" content="{}">"#,
        escape_html(name),
        attribute(content)
    )
}

pub(crate) fn meta_helper(_ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError> {
    let name = args::string("meta", args, 0)?;
    let content = args::string("meta", args, 1)?;
    Ok(Value::from(meta(&name, &content)))
}

pub(crate) fn og_helper(_ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError> {
    let name = args::string("og", args, 0)?;
    let content = args::string("og", args, 1)?;
    Ok(Value::from(og(&name, &content)))
}

pub(crate) fn json_helper(_ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError> {
    let value = args.first().unwrap_or(&Value::Null);
    Ok(Value::from(value.to_string()))
}
