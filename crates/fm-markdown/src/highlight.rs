//! Syntax highlighting of fenced code blocks.

use std::collections::HashMap;

use pulldown_cmark::{CodeBlockKind, Event, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Theme used when none is given.
pub const DEFAULT_THEME: &str = "base16-ocean.light";

/// Code highlighter backed by syntect's bundled syntaxes and themes.
///
/// Languages are looked up by fence token (`rust`, `rs`, `js`...). A block
/// without a language is detected from its first line (shebangs, `<?xml`).
/// Blocks that cannot be highlighted are left to the Markdown renderer.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
    aliases: HashMap<String, String>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Create a highlighter with [`DEFAULT_THEME`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_theme(DEFAULT_THEME)
    }

    /// Create a highlighter with a bundled theme. Unknown names fall back to
    /// syntect's default theme.
    #[must_use]
    pub fn with_theme(name: &str) -> Self {
        let theme = ThemeSet::load_defaults().themes.remove(name).unwrap_or_else(|| {
            tracing::warn!(theme = name, "Unknown highlighting theme");
            Theme::default()
        });
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
            aliases: HashMap::from([("shell".to_owned(), "bash".to_owned())]),
        }
    }

    /// Highlight fences tagged `alias` as `language`.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>, language: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), language.into());
        self
    }

    /// Highlight `code` as HTML (`<pre>` with inline styles).
    ///
    /// Returns `None` for unknown languages and undetectable plain blocks.
    #[must_use]
    pub fn highlight(&self, code: &str, language: Option<&str>) -> Option<String> {
        let syntax = match language {
            Some(language) => {
                let token = self.aliases.get(language).map_or(language, String::as_str);
                self.syntaxes.find_syntax_by_token(token)?
            }
            None => self.syntaxes.find_syntax_by_first_line(code)?,
        };
        match highlighted_html_for_string(code, &self.syntaxes, syntax, &self.theme) {
            Ok(html) => Some(html),
            Err(e) => {
                tracing::warn!(language = %syntax.name, error = %e, "Cannot highlight code block");
                None
            }
        }
    }

    /// Replace highlightable code blocks in `events` with raw HTML.
    pub(crate) fn highlight_events<'a>(
        &self,
        events: impl Iterator<Item = Event<'a>>,
    ) -> Vec<Event<'a>> {
        let mut output = Vec::new();
        let mut block: Option<Vec<Event<'a>>> = None;

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(_)) => block = Some(vec![event]),
                Event::End(TagEnd::CodeBlock) => {
                    let mut events = block.take().unwrap_or_default();
                    events.push(event);
                    match self.highlight_block(&events) {
                        Some(html) => output.push(Event::Html(html.into())),
                        None => output.extend(events),
                    }
                }
                event => match block.as_mut() {
                    Some(events) => events.push(event),
                    None => output.push(event),
                },
            }
        }
        output
    }

    fn highlight_block(&self, events: &[Event<'_>]) -> Option<String> {
        let language = match events.first() {
            Some(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)))) => {
                info.split_whitespace().next()
            }
            _ => None,
        };
        let code: String = events
            .iter()
            .filter_map(|event| match event {
                Event::Text(text) => Some(text.as_ref()),
                _ => None,
            })
            .collect();
        self.highlight(&code, language)
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("theme", &self.theme.name)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_by_language_token() {
        let highlighter = Highlighter::new();
        let html = highlighter.highlight("fn main() {}\n", Some("rust")).unwrap();
        assert!(html.starts_with("<pre style=\""), "{html}");
        assert!(html.contains("<span style=\""));
        assert!(highlighter.highlight("fn main() {}\n", Some("rs")).is_some());
    }

    #[test]
    fn test_highlight_alias() {
        let highlighter = Highlighter::new();
        assert!(highlighter.highlight("echo hi\n", Some("shell")).is_some());
        assert!(highlighter.highlight("x\n", Some("bat-lang")).is_none());
        assert!(
            highlighter
                .with_alias("bat-lang", "python")
                .highlight("x = 1\n", Some("bat-lang"))
                .is_some()
        );
    }

    #[test]
    fn test_highlight_detects_first_line() {
        let highlighter = Highlighter::new();
        assert!(highlighter.highlight("#!/bin/bash\necho hi\n", None).is_some());
        assert!(highlighter.highlight("just words\n", None).is_none());
    }

    #[test]
    fn test_highlight_escapes_html() {
        let html = Highlighter::new()
            .highlight("<x-foo></x-foo>\n", Some("html"))
            .unwrap();
        assert!(!html.contains("<x-foo"), "{html}");
    }
}
