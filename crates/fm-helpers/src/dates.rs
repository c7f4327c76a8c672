//! `dateToString`: human readable dates.

use std::fmt::Write;

use chrono::Datelike;
use fm_core::{HelperError, RenderContext, parse_date};
use serde_json::Value;

use crate::args;
use crate::options::option;

/// Format used when the `dateFormat` option is not set.
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Format a front matter date for the page language.
///
/// The strftime pattern comes from the `dateFormat` option. When the
/// `months` option lists twelve month names, they replace `%B`, so
/// `{dateFormat: "%-d %B %Y", months: [января, ...]}` gives `22 октября 2015`.
pub fn date_to_string(ctx: &RenderContext, date: &str) -> Result<String, HelperError> {
    let parsed = parse_date(date).ok_or_else(|| HelperError::InvalidArgument {
        helper: "dateToString",
        message: format!("invalid date: {date}"),
    })?;

    let mut format = match option(ctx, "dateFormat") {
        Ok(Value::String(format)) if !format.is_empty() => format,
        _ => DEFAULT_DATE_FORMAT.to_owned(),
    };
    if let Some(month) = month_name(ctx, parsed.month0()) {
        format = format.replace("%B", &month.replace('%', "%%"));
    }

    let mut output = String::new();
    write!(output, "{}", parsed.format(&format)).map_err(|_| HelperError::InvalidArgument {
        helper: "dateToString",
        message: format!("invalid date format: {format}"),
    })?;
    Ok(output)
}

fn month_name(ctx: &RenderContext, month0: u32) -> Option<String> {
    let Ok(Value::Array(months)) = option(ctx, "months") else {
        return None;
    };
    if months.len() != 12 {
        return None;
    }
    months
        .get(usize::try_from(month0).ok()?)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

pub(crate) fn date_to_string_helper(
    ctx: &RenderContext,
    args: &[Value],
) -> Result<Value, HelperError> {
    let date = args::string("dateToString", args, 0)?;
    date_to_string(ctx, &date).map(Value::from)
}
