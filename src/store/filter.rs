//! Serializable filter expressions.
//!
//! Predicates are values, not closures: a [`Filter`] can be evaluated against a
//! JSON document directly (the in-memory backend does this) or translated into
//! a backend's native query language (the PostgreSQL backend renders SQL).
//!
//! # Example
//!
//! ```
//! use docrepo::store::{Field, Filter};
//!
//! let adults_named_ada = Field::new("name")
//!     .eq("Ada")
//!     .and(Field::new("age").gte(18));
//!
//! let doc = serde_json::json!({"name": "Ada", "age": 36});
//! assert!(adults_named_ada.matches(doc.as_object().unwrap()));
//! assert!(Filter::All.matches(doc.as_object().unwrap()));
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

use crate::models::{DocumentId, ID_FIELD};
use crate::store::RawDocument;

/// Comparison operator of a [`Filter::Compare`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Operator symbol used in SQL and in the textual filter syntax.
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// A boolean condition over a document's fields.
///
/// Field names are dotted paths into nested objects (`address.city`). A missing
/// field compares as `null` for equality; ordering comparisons only match
/// values of the same JSON type (numbers with numbers, strings with strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Matches every document.
    #[default]
    All,
    Compare {
        field: String,
        cmp: CompareOp,
        value: JsonValue,
    },
    /// Field equals any of the values.
    In {
        field: String,
        values: Vec<JsonValue>,
    },
    /// Field is present (even if `null`).
    Exists { field: String },
    /// All sub-filters match; an empty list matches everything.
    And { filters: Vec<Filter> },
    /// Any sub-filter matches; an empty list matches nothing.
    Or { filters: Vec<Filter> },
    Not { filter: Box<Filter> },
}

impl Filter {
    /// Matches the document with the given identifier.
    pub fn id(id: DocumentId) -> Self {
        Field::new(ID_FIELD).eq(id)
    }

    /// Conjunction, flattening nested `And` nodes.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And { mut filters }, Filter::And { filters: rest }) => {
                filters.extend(rest);
                Filter::And { filters }
            }
            (Filter::And { mut filters }, f) => {
                filters.push(f);
                Filter::And { filters }
            }
            (f, Filter::And { mut filters }) => {
                filters.insert(0, f);
                Filter::And { filters }
            }
            (a, b) => Filter::And {
                filters: vec![a, b],
            },
        }
    }

    /// Disjunction, flattening nested `Or` nodes.
    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::Or { mut filters }, Filter::Or { filters: rest }) => {
                filters.extend(rest);
                Filter::Or { filters }
            }
            (Filter::Or { mut filters }, f) => {
                filters.push(f);
                Filter::Or { filters }
            }
            (a, b) => Filter::Or {
                filters: vec![a, b],
            },
        }
    }

    pub fn negate(self) -> Self {
        match self {
            Filter::Not { filter } => *filter,
            f => Filter::Not {
                filter: Box::new(f),
            },
        }
    }

    /// Evaluates the filter against a raw document.
    pub fn matches(&self, doc: &RawDocument) -> bool {
        match self {
            Filter::All => true,
            Filter::Compare { field, cmp, value } => {
                let actual = lookup(doc, field).unwrap_or(&JsonValue::Null);
                match cmp {
                    CompareOp::Eq => json_eq(actual, value),
                    CompareOp::Ne => !json_eq(actual, value),
                    CompareOp::Gt => json_cmp(actual, value) == Some(Ordering::Greater),
                    CompareOp::Gte => matches!(
                        json_cmp(actual, value),
                        Some(Ordering::Greater | Ordering::Equal)
                    ),
                    CompareOp::Lt => json_cmp(actual, value) == Some(Ordering::Less),
                    CompareOp::Lte => matches!(
                        json_cmp(actual, value),
                        Some(Ordering::Less | Ordering::Equal)
                    ),
                }
            }
            Filter::In { field, values } => {
                let actual = lookup(doc, field).unwrap_or(&JsonValue::Null);
                values.iter().any(|v| json_eq(actual, v))
            }
            Filter::Exists { field } => lookup(doc, field).is_some(),
            Filter::And { filters } => filters.iter().all(|f| f.matches(doc)),
            Filter::Or { filters } => filters.iter().any(|f| f.matches(doc)),
            Filter::Not { filter } => !filter.matches(doc),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Compare { field, cmp, value } => {
                write!(f, "{} {} {}", field, cmp.symbol(), value)
            }
            Filter::In { field, values } => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} in [{}]", field, values.join(", "))
            }
            Filter::Exists { field } => write!(f, "{} exists", field),
            Filter::And { filters } => write_joined(f, filters, " and ", "all"),
            Filter::Or { filters } => write_joined(f, filters, " or ", "none"),
            Filter::Not { filter } => write!(f, "not ({})", filter),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    filters: &[Filter],
    sep: &str,
    empty: &str,
) -> fmt::Result {
    if filters.is_empty() {
        return write!(f, "{}", empty);
    }
    let parts: Vec<String> = filters.iter().map(|p| format!("({})", p)).collect();
    write!(f, "{}", parts.join(sep))
}

/// Fluent builder for single-field filters.
#[derive(Debug, Clone)]
pub struct Field(String);

impl Field {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    fn compare(self, cmp: CompareOp, value: impl Into<JsonValue>) -> Filter {
        Filter::Compare {
            field: self.0,
            cmp,
            value: value.into(),
        }
    }

    pub fn eq(self, value: impl Into<JsonValue>) -> Filter {
        self.compare(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<JsonValue>) -> Filter {
        self.compare(CompareOp::Ne, value)
    }

    pub fn gt(self, value: impl Into<JsonValue>) -> Filter {
        self.compare(CompareOp::Gt, value)
    }

    pub fn gte(self, value: impl Into<JsonValue>) -> Filter {
        self.compare(CompareOp::Gte, value)
    }

    pub fn lt(self, value: impl Into<JsonValue>) -> Filter {
        self.compare(CompareOp::Lt, value)
    }

    pub fn lte(self, value: impl Into<JsonValue>) -> Filter {
        self.compare(CompareOp::Lte, value)
    }

    pub fn is_in<V: Into<JsonValue>>(self, values: impl IntoIterator<Item = V>) -> Filter {
        Filter::In {
            field: self.0,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exists(self) -> Filter {
        Filter::Exists { field: self.0 }
    }
}

/// Splits a dotted field path into its segments.
pub fn field_path(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}

/// Resolves a dotted path inside a document.
pub fn lookup<'a>(doc: &'a RawDocument, field: &str) -> Option<&'a JsonValue> {
    let mut segments = field.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Equality that treats `1` and `1.0` as the same number.
fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => number_cmp(x, y) == Some(Ordering::Equal),
        _ => a == b,
    }
}

/// Ordering between two values of the same JSON type; `None` across types.
fn json_cmp(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => number_cmp(x, y),
        (JsonValue::String(x), JsonValue::String(y)) => Some(x.cmp(y)),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Integers compare exactly; only floats go through `f64`.
fn number_cmp(x: &Number, y: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return Some(a.cmp(&b));
    }
    if x.is_f64() || y.is_f64() {
        return x.as_f64()?.partial_cmp(&y.as_f64()?);
    }
    // A negative i64 against a u64 above i64::MAX
    Some(if x.is_i64() {
        Ordering::Less
    } else {
        Ordering::Greater
    })
}

/// Total order over JSON values used for sorting.
///
/// Values of different types order by type: null, booleans, numbers, strings,
/// arrays, objects.
pub fn sort_cmp(a: &JsonValue, b: &JsonValue) -> Ordering {
    fn rank(v: &JsonValue) -> u8 {
        match v {
            JsonValue::Null => 0,
            JsonValue::Bool(_) => 1,
            JsonValue::Number(_) => 2,
            JsonValue::String(_) => 3,
            JsonValue::Array(_) => 4,
            JsonValue::Object(_) => 5,
        }
    }

    rank(a)
        .cmp(&rank(b))
        .then_with(|| json_cmp(a, b).unwrap_or(Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: JsonValue) -> RawDocument {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_eq_and_missing_field() {
        let d = doc(json!({"name": "Ada", "age": 36}));
        assert!(Field::new("name").eq("Ada").matches(&d));
        assert!(!Field::new("name").eq("Grace").matches(&d));
        assert!(Field::new("email").eq(JsonValue::Null).matches(&d));
        assert!(Field::new("email").ne("x@y").matches(&d));
    }

    #[test]
    fn test_numeric_equality_ignores_representation() {
        let d = doc(json!({"score": 1.0}));
        assert!(Field::new("score").eq(1).matches(&d));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let d = doc(json!({"n": 9_007_199_254_740_993u64}));
        assert!(!Field::new("n").eq(9_007_199_254_740_992u64).matches(&d));
        assert!(Field::new("n").eq(9_007_199_254_740_993u64).matches(&d));
        assert!(Field::new("n").gt(9_007_199_254_740_992u64).matches(&d));
        assert!(!Field::new("n").is_in([9_007_199_254_740_992u64]).matches(&d));

        let big = doc(json!({"n": u64::MAX}));
        assert!(Field::new("n").gt(-1).matches(&big));
        assert!(Field::new("n").ne(u64::MAX - 1).matches(&big));
    }

    #[test]
    fn test_ordering_requires_same_type() {
        let d = doc(json!({"age": 36, "name": "Ada"}));
        assert!(Field::new("age").gt(30).matches(&d));
        assert!(Field::new("age").lte(36).matches(&d));
        assert!(!Field::new("age").gt("30").matches(&d));
        assert!(Field::new("name").lt("B").matches(&d));
        assert!(!Field::new("missing").lt(100).matches(&d));
    }

    #[test]
    fn test_nested_path() {
        let d = doc(json!({"address": {"city": "London"}}));
        assert!(Field::new("address.city").eq("London").matches(&d));
        assert!(Field::new("address.city").exists().matches(&d));
        assert!(!Field::new("address.zip").exists().matches(&d));
    }

    #[test]
    fn test_in_and_exists() {
        let d = doc(json!({"tier": "gold", "note": null}));
        assert!(Field::new("tier").is_in(["silver", "gold"]).matches(&d));
        assert!(!Field::new("tier").is_in(["bronze"]).matches(&d));
        assert!(Field::new("note").exists().matches(&d));
    }

    #[test]
    fn test_combinators() {
        let d = doc(json!({"a": 1, "b": 2}));
        let both = Field::new("a").eq(1).and(Field::new("b").eq(2));
        let either = Field::new("a").eq(9).or(Field::new("b").eq(2));
        assert!(both.matches(&d));
        assert!(either.matches(&d));
        assert!(!both.clone().negate().matches(&d));
        assert_eq!(both.clone().negate().negate(), both);
        assert!(Filter::And { filters: vec![] }.matches(&d));
        assert!(!Filter::Or { filters: vec![] }.matches(&d));
    }

    #[test]
    fn test_and_flattens() {
        let f = Field::new("a")
            .eq(1)
            .and(Field::new("b").eq(2))
            .and(Field::new("c").eq(3));
        match f {
            Filter::And { filters } => assert_eq!(filters.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
        assert_eq!(Filter::All.and(Field::new("a").eq(1)), Field::new("a").eq(1));
    }

    #[test]
    fn test_id_filter() {
        let id = DocumentId::new();
        let d = doc(json!({"_id": id.to_string()}));
        assert!(Filter::id(id).matches(&d));
        assert!(!Filter::id(DocumentId::new()).matches(&d));
    }

    #[test]
    fn test_serde_is_tagged() {
        let f = Field::new("age").gte(18);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["op"], "compare");
        assert_eq!(json["cmp"], "gte");
        let back: Filter = serde_json::from_value(json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn test_sort_cmp_orders_by_type_then_value() {
        assert_eq!(sort_cmp(&json!(null), &json!(1)), Ordering::Less);
        assert_eq!(sort_cmp(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(sort_cmp(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(sort_cmp(&json!(5), &json!("a")), Ordering::Less);
    }
}
