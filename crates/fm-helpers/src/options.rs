//! Localized configuration lookups: `option`, `pageLang`, `__` and
//! `getPageTitle`.

use std::sync::LazyLock;

use fm_core::{HelperError, RenderContext};
use regex::{Captures, Regex};
use serde_json::Value;

use crate::args;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

/// Language slot used when the page has no `lang`.
const BASE: &str = "base";

/// Walk a dotted key (`foo.bar`, `items.0`) through nested objects and arrays.
fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(value, |current, part| match current {
        Value::Object(map) => map.get(part),
        Value::Array(items) => part.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Configuration option for the page language.
///
/// Looks up `key` in `config[lang]` (`lang` defaults to `base`), then in the
/// top level of `config`.
pub fn option(ctx: &RenderContext, key: &str) -> Result<Value, HelperError> {
    let lang = ctx.lang().unwrap_or(BASE);
    let config = ctx.config();
    config
        .and_then(|config| config.get(lang))
        .and_then(|localized| lookup(localized, key))
        .or_else(|| config.and_then(|config| lookup(config, key)))
        .cloned()
        .ok_or_else(|| HelperError::Message(format!("Config option \"{lang}/{key}\" not found.")))
}

fn option_string(ctx: &RenderContext, key: &str) -> Result<String, HelperError> {
    option(ctx, key).map(|value| args::display(&value))
}

/// Page language, or the `lang` option when the page has none.
pub fn page_lang(ctx: &RenderContext) -> Result<String, HelperError> {
    match ctx.lang() {
        Some(lang) => Ok(lang.to_owned()),
        None => option_string(ctx, "lang"),
    }
}

/// Localized string with `{name}` placeholders replaced from `params`.
///
/// Placeholders without a matching (non-empty) parameter are left intact.
pub fn translate(
    ctx: &RenderContext,
    key: &str,
    params: Option<&serde_json::Map<String, Value>>,
) -> Result<String, HelperError> {
    let template = option_string(ctx, key)?;
    let Some(params) = params else {
        return Ok(template);
    };
    Ok(PLACEHOLDER
        .replace_all(&template, |caps: &Captures<'_>| {
            params
                .get(&caps[1])
                .map(args::display)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned())
}

/// Page `<title>` text.
///
/// `pageTitle` wins when set. Otherwise the title (from `options.title` or
/// the page `title`) is suffixed with the site title, unless
/// `options.suffix` is `false`. Without any title the site title is used.
pub fn page_title(
    ctx: &RenderContext,
    options: Option<&serde_json::Map<String, Value>>,
) -> Result<String, HelperError> {
    if let Some(page_title) = ctx.str_value("pageTitle").filter(|s| !s.is_empty()) {
        return Ok(page_title.to_owned());
    }

    let title = options
        .and_then(|options| options.get("title"))
        .and_then(Value::as_str)
        .or_else(|| ctx.str_value("title"))
        .filter(|s| !s.is_empty());
    let suffix = options
        .and_then(|options| options.get("suffix"))
        .and_then(Value::as_bool)
        .unwrap_or(true);

    match title {
        Some(title) if !suffix => Ok(title.to_owned()),
        Some(title) => Ok(format!("{title} — {}", option_string(ctx, "title")?)),
        None => option_string(ctx, "title"),
    }
}

pub(crate) fn option_helper(ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError> {
    option(ctx, &args::string("option", args, 0)?)
}

pub(crate) fn page_lang_helper(ctx: &RenderContext, _args: &[Value]) -> Result<Value, HelperError> {
    page_lang(ctx).map(Value::from)
}

pub(crate) fn translate_helper(ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError> {
    let key = args::string("__", args, 0)?;
    translate(ctx, &key, args::object("__", args, 1)?).map(Value::from)
}

pub(crate) fn page_title_helper(ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError> {
    page_title(ctx, args::object("getPageTitle", args, 0)?).map(Value::from)
}
