//! Parser for the textual filter syntax.
//!
//! Lets a filter be written as a string, for the command line or
//! configuration, and turns it into a [`Filter`].
//!
//! # Example
//!
//! ```
//! use docrepo::store::{parse_filter, Field};
//!
//! let filter = parse_filter(r#"name = "Ada" and age >= 30"#).unwrap();
//! assert_eq!(filter, Field::new("name").eq("Ada").and(Field::new("age").gte(30)));
//! ```

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use serde_json::{Number, Value as JsonValue};

use crate::error::AppError;
use crate::store::{CompareOp, Filter};

#[derive(Parser)]
#[grammar = "store/filter.pest"]
struct FilterParser;

/// Parses a filter expression.
///
/// Grammar summary:
/// - comparisons: `field = value`, `==`, `!=`, `<>`, `>`, `>=`, `<`, `<=`
/// - membership: `field in [v1, v2]`
/// - presence: `field exists`
/// - combinators: `and`/`&&`, `or`/`||`, `not`/`!`, parentheses
/// - values: JSON strings, numbers, `true`, `false`, `null`
///
/// `and` binds tighter than `or`. Keywords are case-insensitive. An empty or
/// all-whitespace input yields [`Filter::All`].
pub fn parse_filter(input: &str) -> Result<Filter, AppError> {
    if input.trim().is_empty() {
        return Ok(Filter::All);
    }

    let mut pairs = FilterParser::parse(Rule::filter, input)
        .map_err(|e| AppError::InvalidFilter(e.to_string()))?;

    let expr = pairs
        .next()
        .and_then(|filter| filter.into_inner().next())
        .ok_or_else(|| AppError::InvalidFilter("empty filter".to_string()))?;

    build_expr(expr)
}

fn build_expr(pair: Pair<'_, Rule>) -> Result<Filter, AppError> {
    let mut result: Option<Filter> = None;
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::term {
            let term = build_term(inner)?;
            result = Some(match result {
                Some(acc) => acc.or(term),
                None => term,
            });
        }
    }
    result.ok_or_else(|| AppError::InvalidFilter("empty expression".to_string()))
}

fn build_term(pair: Pair<'_, Rule>) -> Result<Filter, AppError> {
    let mut factors = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::factor {
            factors.push(build_factor(inner)?);
        }
    }
    // Built by hand rather than with `Filter::and`, which would drop `All`.
    Ok(match factors.len() {
        1 => factors.remove(0),
        _ => Filter::And { filters: factors },
    })
}

fn build_factor(pair: Pair<'_, Rule>) -> Result<Filter, AppError> {
    let mut inner = pair.into_inner();
    let first = inner
        .next()
        .ok_or_else(|| AppError::InvalidFilter("empty factor".to_string()))?;

    match first.as_rule() {
        Rule::not_op => {
            let operand = inner
                .next()
                .ok_or_else(|| AppError::InvalidFilter("missing operand for not".to_string()))?;
            Ok(build_factor(operand)?.negate())
        }
        Rule::expr => build_expr(first),
        Rule::exists => {
            let field = first_field(first)?;
            Ok(Filter::Exists { field })
        }
        Rule::membership => {
            let mut parts = first.into_inner();
            let field = next_text(&mut parts, "field")?;
            let values = parts
                .filter(|p| p.as_rule() != Rule::in_kw)
                .map(build_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Filter::In { field, values })
        }
        Rule::comparison => {
            let mut parts = first.into_inner();
            let field = next_text(&mut parts, "field")?;
            let op = next_text(&mut parts, "operator")?;
            let value = parts
                .next()
                .ok_or_else(|| AppError::InvalidFilter("missing value".to_string()))
                .and_then(build_value)?;
            Ok(Filter::Compare {
                field,
                cmp: compare_op(&op)?,
                value,
            })
        }
        other => Err(AppError::InvalidFilter(format!(
            "unexpected {:?} in filter",
            other
        ))),
    }
}

fn first_field(pair: Pair<'_, Rule>) -> Result<String, AppError> {
    next_text(&mut pair.into_inner(), "field")
}

fn next_text<'i>(
    pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
    what: &str,
) -> Result<String, AppError> {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| AppError::InvalidFilter(format!("missing {}", what)))
}

fn compare_op(symbol: &str) -> Result<CompareOp, AppError> {
    match symbol {
        "=" | "==" => Ok(CompareOp::Eq),
        "!=" | "<>" => Ok(CompareOp::Ne),
        ">" => Ok(CompareOp::Gt),
        ">=" => Ok(CompareOp::Gte),
        "<" => Ok(CompareOp::Lt),
        "<=" => Ok(CompareOp::Lte),
        other => Err(AppError::InvalidFilter(format!(
            "unknown operator '{}'",
            other
        ))),
    }
}

fn build_value(pair: Pair<'_, Rule>) -> Result<JsonValue, AppError> {
    let text = pair.as_str();
    match pair.as_rule() {
        // The escape set is JSON's, so the literal is valid JSON.
        Rule::string => serde_json::from_str::<String>(text)
            .map(JsonValue::String)
            .map_err(|e| AppError::InvalidFilter(format!("bad string {}: {}", text, e))),
        Rule::number => parse_number(text),
        Rule::boolean => Ok(JsonValue::Bool(text.eq_ignore_ascii_case("true"))),
        Rule::null => Ok(JsonValue::Null),
        other => Err(AppError::InvalidFilter(format!(
            "expected a value, found {:?}",
            other
        ))),
    }
}

fn parse_number(text: &str) -> Result<JsonValue, AppError> {
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(JsonValue::Number(n.into()));
        }
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(JsonValue::Number)
        .ok_or_else(|| AppError::InvalidFilter(format!("bad number '{}'", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Field;
    use serde_json::json;

    #[test]
    fn test_simple_comparison() {
        assert_eq!(parse_filter(r#"name = "Ada""#).unwrap(), Field::new("name").eq("Ada"));
        assert_eq!(parse_filter("age >= 18").unwrap(), Field::new("age").gte(18));
        assert_eq!(parse_filter("age != 3").unwrap(), Field::new("age").ne(3));
        assert_eq!(parse_filter("age <> 3").unwrap(), Field::new("age").ne(3));
    }

    #[test]
    fn test_values() {
        assert_eq!(parse_filter("score < -1.5").unwrap(), Field::new("score").lt(-1.5));
        assert_eq!(parse_filter("vip = true").unwrap(), Field::new("vip").eq(true));
        assert_eq!(
            parse_filter("email == null").unwrap(),
            Field::new("email").eq(JsonValue::Null)
        );
        assert_eq!(
            parse_filter(r#"note = "say \"hi\"\n""#).unwrap(),
            Field::new("note").eq("say \"hi\"\n")
        );
    }

    #[test]
    fn test_nested_field_path() {
        assert_eq!(
            parse_filter(r#"address.city = "Paris""#).unwrap(),
            Field::new("address.city").eq("Paris")
        );
        assert_eq!(parse_filter("_id exists").unwrap(), Field::new("_id").exists());
    }

    #[test]
    fn test_membership() {
        assert_eq!(
            parse_filter(r#"tier in ["gold", "silver"]"#).unwrap(),
            Field::new("tier").is_in(["gold", "silver"])
        );
        assert_eq!(
            parse_filter("tier in []").unwrap(),
            Filter::In {
                field: "tier".to_string(),
                values: vec![]
            }
        );
    }

    #[test]
    fn test_precedence_and_binds_tighter() {
        let parsed = parse_filter("a = 1 or b = 2 and c = 3").unwrap();
        let expected = Field::new("a")
            .eq(1)
            .or(Field::new("b").eq(2).and(Field::new("c").eq(3)));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parentheses_and_not() {
        let parsed = parse_filter("not (a = 1 || b = 2) && c exists").unwrap();
        let expected = Field::new("a")
            .eq(1)
            .or(Field::new("b").eq(2))
            .negate()
            .and(Field::new("c").exists());
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_keywords_are_case_insensitive_and_bounded() {
        let parsed = parse_filter("notes = 1 AND android = 2").unwrap();
        assert_eq!(
            parsed,
            Field::new("notes").eq(1).and(Field::new("android").eq(2))
        );
    }

    #[test]
    fn test_empty_is_all() {
        assert_eq!(parse_filter("   ").unwrap(), Filter::All);
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_filter("name = ").unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
        assert!(parse_filter("= 3").is_err());
        assert!(parse_filter("a = 1 and").is_err());
    }

    #[test]
    fn test_parsed_filter_evaluates() {
        let filter = parse_filter(r#"name = "Ada" and age > 30"#).unwrap();
        let doc = json!({"name": "Ada", "age": 36});
        assert!(filter.matches(doc.as_object().unwrap()));
    }
}
