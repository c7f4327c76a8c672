//! Front matter splitting.
//!
//! A source file may start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Hello
//! layout: post
//! ---
//! Body text
//! ```
//!
//! The block must open on the very first line. A block that is never closed
//! is not front matter: the whole text becomes the body.

use serde_json::{Map, Value};

const DELIMITER: &str = "---";

/// Source text split into attributes and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter<'a> {
    /// Parsed YAML attributes (empty when there is no block).
    pub attributes: Map<String, Value>,
    /// Text after the closing delimiter line.
    pub body: &'a str,
}

/// Split `source` into front matter attributes and body.
///
/// Never fails: invalid YAML or a block that is not a mapping is logged and
/// yields empty attributes while the body is still split off.
pub fn split_front_matter(source: &str) -> FrontMatter<'_> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = strip_delimiter_line(source) else {
        return FrontMatter {
            attributes: Map::new(),
            body: source,
        };
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == DELIMITER {
            return FrontMatter {
                attributes: parse_attributes(&rest[..offset]),
                body: &rest[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    FrontMatter {
        attributes: Map::new(),
        body: source,
    }
}

/// Return the text after an opening `---` line.
fn strip_delimiter_line(source: &str) -> Option<&str> {
    let rest = source.strip_prefix(DELIMITER)?;
    rest.strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))
}

fn parse_attributes(yaml: &str) -> Map<String, Value> {
    if yaml.trim().is_empty() {
        return Map::new();
    }
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(_) => {
            tracing::warn!("Front matter is not a mapping, ignoring");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cannot parse front matter");
            Map::new()
        }
    }
}
