//! Render context: helpers, site configuration and document fields merged
//! into one flat namespace for templates.
//!
//! The context is built as an ordered overlay of three layers, later layers
//! winning on key conflicts:
//!
//! 1. helpers (named functions)
//! 2. `config` (the merged site configuration)
//! 3. document fields
//!
//! So a document field named `option` hides the `option` helper, and a
//! document field named `config` hides the site configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::document::{Document, LANG, URL};

/// Key of the site configuration in a render context.
pub const CONFIG: &str = "config";

/// Error returned by a helper call.
#[derive(Debug, thiserror::Error)]
pub enum HelperError {
    /// Helper-specific failure.
    #[error("{0}")]
    Message(String),
    /// An argument has the wrong type or is missing.
    #[error("Invalid argument for {helper}(): {message}")]
    InvalidArgument {
        /// Helper name.
        helper: &'static str,
        /// What was wrong.
        message: String,
    },
    /// A file the helper reads could not be read.
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// No helper with this name in the context.
    #[error("Unknown helper: {0}")]
    Unknown(String),
}

/// Function callable from templates.
///
/// Helpers receive the context they are called from, so they can read the
/// current document (e.g. its `lang`) and the site configuration.
pub trait Helper: Send + Sync {
    /// Call the helper with positional arguments.
    fn call(&self, ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError>;
}

impl<F> Helper for F
where
    F: Fn(&RenderContext, &[Value]) -> Result<Value, HelperError> + Send + Sync,
{
    fn call(&self, ctx: &RenderContext, args: &[Value]) -> Result<Value, HelperError> {
        self(ctx, args)
    }
}

/// Named helpers merged into every render context.
#[derive(Clone, Default)]
pub struct Helpers {
    helpers: BTreeMap<String, Arc<dyn Helper>>,
}

impl Helpers {
    /// Create an empty helper bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a helper, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, helper: impl Helper + 'static) {
        self.helpers.insert(name.into(), Arc::new(helper));
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, helper: impl Helper + 'static) -> Self {
        self.insert(name, helper);
        self
    }

    /// Add every helper of `other`, replacing same-named ones.
    pub fn extend(&mut self, other: &Helpers) {
        for (name, helper) in &other.helpers {
            self.helpers.insert(name.clone(), Arc::clone(helper));
        }
    }

    /// Helper by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Helper>> {
        self.helpers.get(name)
    }

    /// Iterate over helpers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<dyn Helper>)> {
        self.helpers.iter()
    }

    /// Number of helpers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    /// Whether there are no helpers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }
}

impl std::fmt::Debug for Helpers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.helpers.keys()).finish()
    }
}

/// One name in a render context.
#[derive(Clone)]
pub enum ContextEntry {
    /// Plain data.
    Value(Value),
    /// Callable helper.
    Helper(Arc<dyn Helper>),
}

impl std::fmt::Debug for ContextEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Helper(_) => f.write_str("Helper(..)"),
        }
    }
}

/// Flat namespace handed to a template renderer.
#[derive(Clone, Debug, Default)]
pub struct RenderContext {
    entries: BTreeMap<String, ContextEntry>,
}

impl RenderContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay `entries` over the context; each key replaces an existing entry of
    /// any kind.
    pub fn overlay<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, ContextEntry)>,
    {
        self.entries.extend(entries);
    }

    /// Lay plain values over the context.
    pub fn overlay_values<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.overlay(
            values
                .into_iter()
                .map(|(key, value)| (key, ContextEntry::Value(value))),
        );
    }

    /// Lay helpers over the context.
    pub fn overlay_helpers(&mut self, helpers: &Helpers) {
        self.overlay(
            helpers
                .iter()
                .map(|(name, helper)| (name.clone(), ContextEntry::Helper(Arc::clone(helper)))),
        );
    }

    /// Entry by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ContextEntry> {
        self.entries.get(key)
    }

    /// Data value by name. Helpers yield `None`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        match self.entries.get(key)? {
            ContextEntry::Value(value) => Some(value),
            ContextEntry::Helper(_) => None,
        }
    }

    /// String data value by name.
    #[must_use]
    pub fn str_value(&self, key: &str) -> Option<&str> {
        self.value(key).and_then(Value::as_str)
    }

    /// Helper by name. Data values yield `None`.
    #[must_use]
    pub fn helper(&self, key: &str) -> Option<&Arc<dyn Helper>> {
        match self.entries.get(key)? {
            ContextEntry::Helper(helper) => Some(helper),
            ContextEntry::Value(_) => None,
        }
    }

    /// Call the helper `name` with this context.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, HelperError> {
        let helper = self
            .helper(name)
            .ok_or_else(|| HelperError::Unknown(name.to_owned()))?;
        helper.call(self, args)
    }

    /// Site configuration (the `config` entry).
    #[must_use]
    pub fn config(&self) -> Option<&Value> {
        self.value(CONFIG)
    }

    /// Page language (`lang` entry).
    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        self.str_value(LANG)
    }

    /// Page URL (`url` entry).
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.str_value(URL)
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextEntry)> {
        self.entries.iter()
    }

    /// All data values as one JSON object (helpers omitted).
    #[must_use]
    pub fn data(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .filter_map(|(key, entry)| match entry {
                ContextEntry::Value(value) => Some((key.clone(), value.clone())),
                ContextEntry::Helper(_) => None,
            })
            .collect()
    }
}

/// Build the render context of `document`.
///
/// Precedence (later wins): helpers < `config` < document fields.
pub fn make_context(document: &Document, config: &Value, helpers: &Helpers) -> RenderContext {
    let mut ctx = RenderContext::new();
    ctx.overlay_helpers(helpers);
    ctx.overlay_values([(CONFIG.to_owned(), config.clone())]);
    ctx.overlay_values(document.iter().map(|(k, v)| (k.clone(), v.clone())));
    ctx
}
