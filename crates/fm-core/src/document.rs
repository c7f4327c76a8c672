//! Document model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field: relative source path (`"en/posts/hello.md"`).
pub const SOURCE_PATH: &str = "sourcePath";
/// Reserved field: page URL derived from the source path.
pub const URL: &str = "url";
/// Reserved field: rendered body.
pub const CONTENT: &str = "content";
/// Reserved field: content before the cut tag.
pub const EXCERPT: &str = "excerpt";
/// Reserved field: content after the cut tag.
pub const MORE: &str = "more";
/// Reserved field: template name used to generate the page.
pub const LAYOUT: &str = "layout";
/// Conventional field: page language.
pub const LANG: &str = "lang";

/// One parsed source file or one synthetic page (e.g. a listing page).
///
/// A document is a flat mapping of arbitrary front matter fields plus the
/// reserved computed fields (`sourcePath`, `url`, `content`, and optionally
/// `excerpt`/`more`). It is a plain value: pipeline stages return new
/// documents instead of mutating shared ones.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Field value by name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Whether the field is present (even if `null`).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// String field value. Non-string values yield `None`.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Relative source path.
    #[must_use]
    pub fn source_path(&self) -> Option<&str> {
        self.get_str(SOURCE_PATH)
    }

    /// Page URL.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.get_str(URL)
    }

    /// Rendered content.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.get_str(CONTENT)
    }

    /// Content before the cut tag.
    #[must_use]
    pub fn excerpt(&self) -> Option<&str> {
        self.get_str(EXCERPT)
    }

    /// Content after the cut tag.
    #[must_use]
    pub fn more(&self) -> Option<&str> {
        self.get_str(MORE)
    }

    /// Layout (template) name.
    #[must_use]
    pub fn layout(&self) -> Option<&str> {
        self.get_str(LAYOUT)
    }

    /// Page language.
    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        self.get_str(LANG)
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the document, returning its field map.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// The document as a JSON object value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Value::Object(document.0)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
