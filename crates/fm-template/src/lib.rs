//! Page templates for fledermaus.
//!
//! [`JinjaRenderer`] implements [`fm_core::TemplateRenderer`] on top of
//! minijinja. A document's `layout` names the template file: layout `post`
//! renders `<templates>/post.jinja`, layout `sitemap.xml` renders
//! `<templates>/sitemap.xml.jinja`. The [`FEED_LAYOUT`] layout is built in
//! and renders an RSS feed without a template file.
//!
//! Inside a template every context value is a variable and every helper is
//! a function bound to the page being rendered:
//!
//! ```jinja
//! <title>{{ getPageTitle() }}</title>
//! <h1>{{ title }}</h1>
//! {{ content }}
//! <a href="{{ absolutizeUrl(url) }}">{{ __("permalink") }}</a>
//! ```
//!
//! Templates are not auto-escaped: `content` and helper output are HTML.

pub mod feed;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fm_core::{ContextEntry, RenderContext, TemplateError, TemplateRenderer};
use minijinja::value::Rest;
use minijinja::{AutoEscape, Environment, ErrorKind, Value};

pub use feed::{FEED_LAYOUT, FeedError, render_feed};

/// Template file extension appended to layout names.
pub const TEMPLATE_EXTENSION: &str = "jinja";

/// Renders layouts from a folder of Jinja templates.
pub struct JinjaRenderer {
    env: Environment<'static>,
    templates_dir: PathBuf,
}

impl JinjaRenderer {
    /// Create a renderer loading templates from `templates_dir`.
    ///
    /// Templates are read lazily, on first use.
    #[must_use]
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        let templates_dir = templates_dir.into();
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(&templates_dir));
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env, templates_dir }
    }

    /// Folder templates are loaded from.
    #[must_use]
    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    fn render_template(&self, layout: &str, ctx: &RenderContext) -> Result<String, TemplateError> {
        let name = format!("{layout}.{TEMPLATE_EXTENSION}");
        let template = self.env.get_template(&name).map_err(|e| {
            if e.kind() == ErrorKind::TemplateNotFound {
                TemplateError::NotFound(name.clone())
            } else {
                render_error(&name, &e)
            }
        })?;
        template
            .render(context_value(ctx))
            .map_err(|e| render_error(&name, &e))
    }
}

impl std::fmt::Debug for JinjaRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JinjaRenderer")
            .field("templates_dir", &self.templates_dir)
            .finish_non_exhaustive()
    }
}

impl TemplateRenderer for JinjaRenderer {
    fn render(&self, template: &str, ctx: &RenderContext) -> Result<String, TemplateError> {
        if template == FEED_LAYOUT {
            return Ok(render_feed(ctx));
        }
        self.render_template(template, ctx)
    }
}

fn render_error(template: &str, error: &minijinja::Error) -> TemplateError {
    let mut message = error.to_string();
    if let Some(detail) = error.detail()
        && !message.contains(detail)
    {
        message = format!("{message}: {detail}");
    }
    TemplateError::Render {
        template: template.to_owned(),
        message,
    }
}

/// Template globals for one render: values as-is, helpers as functions
/// bound to `ctx`.
fn context_value(ctx: &RenderContext) -> Value {
    let shared = Arc::new(ctx.clone());
    let globals: BTreeMap<String, Value> = ctx
        .iter()
        .map(|(name, entry)| {
            let value = match entry {
                ContextEntry::Value(value) => Value::from_serialize(value),
                ContextEntry::Helper(_) => helper_function(&shared, name),
            };
            (name.clone(), value)
        })
        .collect();
    Value::from(globals)
}

fn helper_function(ctx: &Arc<RenderContext>, name: &str) -> Value {
    let ctx = Arc::clone(ctx);
    let name = name.to_owned();
    Value::from_function(move |args: Rest<Value>| -> Result<Value, minijinja::Error> {
        let args = args
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
        ctx.call(&name, &args)
            .map(|result| Value::from_serialize(&result))
            .map_err(|e| {
                minijinja::Error::new(ErrorKind::InvalidOperation, format!("{name}(): {e}"))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_core::{Document, HelperError, Helpers, make_context};
    use pretty_assertions::assert_eq;
    use serde_json::{Value as JsonValue, json};
    use std::fs;
    use tempfile::TempDir;

    fn renderer(templates: &[(&str, &str)]) -> (TempDir, JinjaRenderer) {
        let tmp = TempDir::new().unwrap();
        for (name, source) in templates {
            fs::write(tmp.path().join(name), source).unwrap();
        }
        let renderer = JinjaRenderer::new(tmp.path());
        (tmp, renderer)
    }

    #[test]
    fn test_render_layout_with_document_fields() {
        let (_tmp, renderer) =
            renderer(&[("layout.jinja", "<div><h1>{{ title }}</h1>{{ content }}</div>")]);
        let document = Document::new().with("title", "Hello").with("content", "<b>Test</b>");
        let ctx = make_context(&document, &json!({}), &Helpers::new());

        let html = renderer.render("layout", &ctx).unwrap();

        assert_eq!(html, "<div><h1>Hello</h1><b>Test</b></div>");
    }

    #[test]
    fn test_config_is_available() {
        let (_tmp, renderer) = renderer(&[("page.jinja", "{{ config.base.title }}")]);
        let ctx = make_context(
            &Document::new(),
            &json!({"base": {"title": "My blog"}}),
            &Helpers::new(),
        );
        assert_eq!(renderer.render("page", &ctx).unwrap(), "My blog");
    }

    #[test]
    fn test_helpers_are_bound_to_page() {
        let (_tmp, renderer) = renderer(&[("page.jinja", "{{ greet('Hi') }}")]);
        let helpers = Helpers::new().with(
            "greet",
            |ctx: &RenderContext, args: &[JsonValue]| -> Result<JsonValue, HelperError> {
                let greeting = args[0].as_str().unwrap_or_default();
                let title = ctx.str_value("title").unwrap_or_default();
                Ok(JsonValue::from(format!("{greeting}, {title}!")))
            },
        );
        let ctx = make_context(&Document::new().with("title", "Page"), &json!({}), &helpers);

        assert_eq!(renderer.render("page", &ctx).unwrap(), "Hi, Page!");
    }

    #[test]
    fn test_helper_error_fails_render() {
        let (_tmp, renderer) = renderer(&[("page.jinja", "{{ broken() }}")]);
        let helpers = Helpers::new().with(
            "broken",
            |_: &RenderContext, _: &[JsonValue]| -> Result<JsonValue, HelperError> {
                Err(HelperError::Message("Out of cheese".to_owned()))
            },
        );
        let ctx = make_context(&Document::new(), &json!({}), &helpers);

        let err = renderer.render("page", &ctx).unwrap_err();

        match err {
            TemplateError::Render { template, message } => {
                assert_eq!(template, "page.jinja");
                assert!(message.contains("Out of cheese"), "{message}");
            }
            TemplateError::NotFound(_) => panic!("expected render error"),
        }
    }

    #[test]
    fn test_missing_template() {
        let (_tmp, renderer) = renderer(&[]);
        let ctx = make_context(&Document::new(), &json!({}), &Helpers::new());
        assert!(matches!(
            renderer.render("nope", &ctx),
            Err(TemplateError::NotFound(name)) if name == "nope.jinja"
        ));
    }

    #[test]
    fn test_syntax_error_names_template() {
        let (_tmp, renderer) = renderer(&[("bad.jinja", "{{ title ")]);
        let ctx = make_context(&Document::new(), &json!({}), &Helpers::new());
        assert!(matches!(
            renderer.render("bad", &ctx),
            Err(TemplateError::Render { template, .. }) if template == "bad.jinja"
        ));
    }

    #[test]
    fn test_feed_layout_needs_no_template() {
        let (_tmp, renderer) = renderer(&[]);
        let document = Document::new().with("sourcePath", "feed.md");
        let ctx = make_context(&document, &json!({}), &Helpers::new());

        let output = renderer.render(FEED_LAYOUT, &ctx).unwrap();

        assert!(output.contains("missing required property &quot;title&quot;"));
    }
}
