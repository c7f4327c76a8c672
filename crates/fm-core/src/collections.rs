//! Filtering, ordering and grouping of document lists.
//!
//! All operations borrow their input and return new lists, so the same
//! document list can feed several listings.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;

use crate::document::Document;

type PredicateFn = dyn Fn(Option<&Value>) -> bool + Send + Sync;
type GroupFn = dyn Fn(&Document) -> Option<Value> + Send + Sync;

/// Condition one document field must satisfy.
pub enum Criterion {
    /// Field equals this value. Numbers compare numerically.
    Equals(Value),
    /// Field's string form matches this pattern. Missing and `null` fields
    /// never match.
    Matches(Regex),
    /// Field value (or `None` when missing) passes this predicate.
    Predicate(Box<PredicateFn>),
}

impl Criterion {
    /// Build a [`Criterion::Predicate`].
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Box::new(predicate))
    }

    /// Whether `value` satisfies this criterion.
    #[must_use]
    pub fn is_match(&self, value: Option<&Value>) -> bool {
        match self {
            Self::Equals(expected) => value.is_some_and(|value| values_equal(value, expected)),
            Self::Matches(pattern) => value
                .and_then(string_form)
                .is_some_and(|text| pattern.is_match(&text)),
            Self::Predicate(predicate) => predicate(value),
        }
    }
}

impl std::fmt::Debug for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            Self::Matches(pattern) => f.debug_tuple("Matches").field(&pattern.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<Value> for Criterion {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

impl From<&str> for Criterion {
    fn from(value: &str) -> Self {
        Self::Equals(Value::from(value))
    }
}

impl From<Regex> for Criterion {
    fn from(pattern: Regex) -> Self {
        Self::Matches(pattern)
    }
}

/// Field criteria; a document passes when every criterion matches.
pub type Criteria = BTreeMap<String, Criterion>;

/// Keep documents matching every criterion, preserving order.
#[must_use]
pub fn filter_documents(documents: &[Document], criteria: &Criteria) -> Vec<Document> {
    documents
        .iter()
        .filter(|document| {
            criteria
                .iter()
                .all(|(field, criterion)| criterion.is_match(document.get(field)))
        })
        .cloned()
        .collect()
}

/// One sort key: a field name with a direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortField {
    /// Field to compare.
    pub field: String,
    /// Sort from largest to smallest.
    pub descending: bool,
}

impl SortField {
    /// Parse `"name"` (ascending) or `"-name"` (descending).
    #[must_use]
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_owned(),
                descending: true,
            },
            None => Self {
                field: key.to_owned(),
                descending: false,
            },
        }
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = compare_values(a.get(&self.field), b.get(&self.field));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Sort documents by a compound key.
///
/// Each key is a field name, with a `-` prefix for descending order. The
/// first field is the primary key; later fields break ties. The sort is
/// stable. Missing and `null` values sort after all others in ascending
/// order.
#[must_use]
pub fn order_documents<S: AsRef<str>>(documents: &[Document], fields: &[S]) -> Vec<Document> {
    let fields: Vec<SortField> = fields.iter().map(|f| SortField::parse(f.as_ref())).collect();
    let mut sorted = documents.to_vec();
    sorted.sort_by(|a, b| {
        fields
            .iter()
            .map(|field| field.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// How to compute a document's group value.
pub enum GroupBy {
    /// Value of a field.
    Field(String),
    /// Result of a function; `None` skips the document.
    Function(Box<GroupFn>),
}

impl GroupBy {
    /// Group by a field.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Group by a computed value.
    pub fn function<F>(function: F) -> Self
    where
        F: Fn(&Document) -> Option<Value> + Send + Sync + 'static,
    {
        Self::Function(Box::new(function))
    }

    fn value_of(&self, document: &Document) -> Option<Value> {
        match self {
            Self::Field(name) => document.get(name).cloned(),
            Self::Function(function) => function(document),
        }
    }
}

impl From<&str> for GroupBy {
    fn from(name: &str) -> Self {
        Self::field(name)
    }
}

/// Group documents by field value or computed value.
///
/// An array value puts the document into the group of every element (a post
/// tagged `[a, b]` lands in both `a` and `b`). Absent and falsy values
/// (`null`, `false`, `0`, `""`) exclude the document. Groups keep document
/// order.
#[must_use]
pub fn group_documents(documents: &[Document], by: &GroupBy) -> BTreeMap<String, Vec<Document>> {
    let mut groups: BTreeMap<String, Vec<Document>> = BTreeMap::new();
    for document in documents {
        let Some(value) = by.value_of(document) else {
            continue;
        };
        let keys: Vec<Value> = match value {
            Value::Array(items) => items,
            other => vec![other],
        };
        let mut seen: Vec<String> = Vec::new();
        for key in keys.iter().filter(|key| !is_falsy(key)).filter_map(string_form) {
            if seen.contains(&key) {
                continue;
            }
            groups.entry(key.clone()).or_default().push(document.clone());
            seen.push(key);
        }
    }
    groups
}

#[allow(clippy::float_cmp)]
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// String form used for pattern matching and group keys.
fn string_form(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[allow(clippy::float_cmp)]
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Rank of a value type in mixed-type comparisons.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) | Value::Object(_) => 3,
        Value::Null => 4,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    static_assertions::assert_impl_all!(Criterion: Send, Sync);
    static_assertions::assert_impl_all!(GroupBy: Send, Sync);

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => Document::from(map),
            _ => panic!("document must be an object"),
        }
    }

    fn titles(documents: &[Document]) -> Vec<&str> {
        documents
            .iter()
            .map(|d| d.get_str("title").unwrap_or_default())
            .collect()
    }

    fn sample() -> Vec<Document> {
        vec![
            doc(json!({"title": "A", "a": 1, "b": 2, "lang": "en", "url": "/posts/a"})),
            doc(json!({"title": "B", "a": 1, "b": 3, "lang": "ru", "url": "/posts/b"})),
            doc(json!({"title": "C", "a": 2, "b": 2, "lang": "en", "url": "/about"})),
        ]
    }

    #[test]
    fn test_filter_and_semantics() {
        let mut criteria = Criteria::new();
        criteria.insert("a".to_owned(), json!(1).into());
        criteria.insert("b".to_owned(), json!(2).into());

        let result = filter_documents(&sample(), &criteria);

        assert_eq!(titles(&result), vec!["A"]);
    }

    #[test]
    fn test_filter_regex() {
        let mut criteria = Criteria::new();
        criteria.insert("url".to_owned(), Regex::new("^/posts/").unwrap().into());
        criteria.insert("lang".to_owned(), "en".into());

        let result = filter_documents(&sample(), &criteria);

        assert_eq!(titles(&result), vec!["A"]);
    }

    #[test]
    fn test_filter_regex_on_numbers_and_missing() {
        let mut criteria = Criteria::new();
        criteria.insert("b".to_owned(), Regex::new("^3$").unwrap().into());
        assert_eq!(titles(&filter_documents(&sample(), &criteria)), vec!["B"]);

        let mut criteria = Criteria::new();
        criteria.insert("missing".to_owned(), Regex::new(".*").unwrap().into());
        assert!(filter_documents(&sample(), &criteria).is_empty());
    }

    #[test]
    fn test_filter_predicate() {
        let mut criteria = Criteria::new();
        criteria.insert(
            "b".to_owned(),
            Criterion::predicate(|value| value.and_then(Value::as_i64).is_some_and(|b| b > 2)),
        );

        assert_eq!(titles(&filter_documents(&sample(), &criteria)), vec!["B"]);
    }

    #[test]
    fn test_filter_missing_field_is_not_equal_to_null() {
        let mut criteria = Criteria::new();
        criteria.insert("missing".to_owned(), Value::Null.into());
        assert!(filter_documents(&sample(), &criteria).is_empty());
    }

    #[test]
    fn test_filter_empty_criteria_keeps_everything() {
        assert_eq!(filter_documents(&sample(), &Criteria::new()).len(), 3);
    }

    #[test]
    fn test_filter_integer_equals_float() {
        let docs = vec![doc(json!({"title": "X", "n": 2.0}))];
        let mut criteria = Criteria::new();
        criteria.insert("n".to_owned(), json!(2).into());
        assert_eq!(filter_documents(&docs, &criteria).len(), 1);
    }

    #[test]
    fn test_sort_field_parse() {
        assert_eq!(
            SortField::parse("-date"),
            SortField {
                field: "date".to_owned(),
                descending: true
            }
        );
        assert_eq!(
            SortField::parse("title"),
            SortField {
                field: "title".to_owned(),
                descending: false
            }
        );
    }

    #[test]
    fn test_order_compound_key() {
        let result = order_documents(&sample(), &["b", "-a"]);
        assert_eq!(titles(&result), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_order_descending_strings() {
        let result = order_documents(&sample(), &["-title"]);
        assert_eq!(titles(&result), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_order_numbers_numerically() {
        let docs = vec![
            doc(json!({"title": "ten", "n": 10})),
            doc(json!({"title": "two", "n": 2})),
            doc(json!({"title": "half", "n": 0.5})),
        ];
        assert_eq!(titles(&order_documents(&docs, &["n"])), vec!["half", "two", "ten"]);
    }

    #[test]
    fn test_order_missing_values_last() {
        let docs = vec![
            doc(json!({"title": "none"})),
            doc(json!({"title": "b", "date": "2015-02-01"})),
            doc(json!({"title": "a", "date": "2015-01-01"})),
        ];
        assert_eq!(titles(&order_documents(&docs, &["date"])), vec!["a", "b", "none"]);
        assert_eq!(titles(&order_documents(&docs, &["-date"])), vec!["none", "b", "a"]);
    }

    #[test]
    fn test_order_is_stable_and_does_not_mutate_input() {
        let docs = sample();
        let result = order_documents(&docs, &["lang"]);
        assert_eq!(titles(&result), vec!["A", "C", "B"]);
        assert_eq!(titles(&docs), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_group_fan_out() {
        let docs = vec![
            doc(json!({"title": "1", "tags": ["x", "y"]})),
            doc(json!({"title": "2", "tags": ["y"]})),
            doc(json!({"title": "3"})),
            doc(json!({"title": "4", "tags": []})),
        ];

        let groups = group_documents(&docs, &GroupBy::field("tags"));

        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(titles(&groups["x"]), vec!["1"]);
        assert_eq!(titles(&groups["y"]), vec!["1", "2"]);
    }

    #[test]
    fn test_group_fan_out_skips_falsy_elements() {
        let docs = vec![doc(json!({"title": "1", "tags": ["", "x", 0, false, null, "x"]}))];

        let groups = group_documents(&docs, &GroupBy::field("tags"));

        assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["x"]);
        assert_eq!(titles(&groups["x"]), vec!["1"]);
    }

    #[test]
    fn test_group_scalar_field_skips_falsy() {
        let docs = vec![
            doc(json!({"title": "1", "lang": "en"})),
            doc(json!({"title": "2", "lang": ""})),
            doc(json!({"title": "3", "lang": null})),
            doc(json!({"title": "4", "lang": "ru"})),
            doc(json!({"title": "5", "lang": "en"})),
        ];

        let groups = group_documents(&docs, &"lang".into());

        assert_eq!(groups.len(), 2);
        assert_eq!(titles(&groups["en"]), vec!["1", "5"]);
        assert_eq!(titles(&groups["ru"]), vec!["4"]);
    }

    #[test]
    fn test_group_by_function() {
        let by = GroupBy::function(|document| {
            document
                .get_str("date")
                .map(|date| Value::from(&date[..4]))
        });
        let docs = vec![
            doc(json!({"title": "1", "date": "2014-05-01"})),
            doc(json!({"title": "2", "date": "2015-01-01"})),
            doc(json!({"title": "3"})),
            doc(json!({"title": "4", "date": "2014-12-31"})),
        ];

        let groups = group_documents(&docs, &by);

        assert_eq!(titles(&groups["2014"]), vec!["1", "4"]);
        assert_eq!(titles(&groups["2015"]), vec!["2"]);
    }

    #[test]
    fn test_group_by_function_fans_out_arrays() {
        let by = GroupBy::function(|document| document.get("tags").cloned());
        let docs = vec![doc(json!({"title": "1", "tags": ["x", "y"]}))];

        let groups = group_documents(&docs, &by);

        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_group_numeric_keys() {
        let docs = vec![doc(json!({"title": "1", "year": 2015}))];
        let groups = group_documents(&docs, &GroupBy::field("year"));
        assert_eq!(titles(&groups["2015"]), vec!["1"]);
    }

    #[test]
    fn test_group_duplicate_array_values_add_once() {
        let docs = vec![doc(json!({"title": "1", "tags": ["x", "x"]}))];
        let groups = group_documents(&docs, &GroupBy::field("tags"));
        assert_eq!(groups["x"].len(), 1);
    }
}
