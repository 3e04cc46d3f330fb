//! Collection query options (`$filter`, `$orderby`, `$top`, `$skip`,
//! `$select`, `$expand`, `$count`).
//!
//! Options are applied in memory to the JSON projection of rows the caller is
//! already allowed to see. Field names match case-insensitively; nested fields
//! are addressed with `/`.

pub mod filter;

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::AppError;
use crate::response::Collection;

pub use filter::Expr;

/// Upper bound (and default) for `$top`.
pub const MAX_TOP: usize = 100;

/// A malformed query option.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid $filter: {0}")]
    Filter(String),
    #[error("Invalid {option}: {message}")]
    Option { option: &'static str, message: String },
    #[error("Unknown query option: {0}")]
    Unknown(String),
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// One `$orderby` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub descending: bool,
}

/// Parsed query options.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderKey>,
    pub top: usize,
    pub skip: usize,
    pub select: Option<Vec<String>>,
    pub expand: Vec<String>,
    pub count: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: None,
            order_by: Vec::new(),
            top: MAX_TOP,
            skip: 0,
            select: None,
            expand: Vec::new(),
            count: false,
        }
    }
}

impl ListQuery {
    /// Parse options from raw query parameters.
    ///
    /// `expandable` lists the relations this collection can expand. Parameters
    /// without a leading `$` are left to the handler (e.g. `startDate`).
    ///
    /// # Errors
    ///
    /// Returns `QueryError` for malformed values, unknown `$` options, or an
    /// expansion this collection does not offer.
    pub fn parse(params: &HashMap<String, String>, expandable: &[&str]) -> Result<Self, QueryError> {
        let mut query = Self::default();

        for (key, value) in params {
            let Some(option) = key.strip_prefix('$') else {
                continue;
            };
            match option.to_ascii_lowercase().as_str() {
                "filter" => {
                    if !value.trim().is_empty() {
                        query.filter = Some(Expr::parse(value)?);
                    }
                }
                "orderby" => query.order_by = parse_order_by(value)?,
                "top" => query.top = parse_count("$top", value)?.min(MAX_TOP),
                "skip" => query.skip = parse_count("$skip", value)?,
                "select" => query.select = Some(split_list(value)),
                "expand" => {
                    for relation in split_list(value) {
                        let Some(known) = expandable
                            .iter()
                            .find(|name| name.eq_ignore_ascii_case(&relation))
                        else {
                            return Err(QueryError::Option {
                                option: "$expand",
                                message: format!("'{relation}' cannot be expanded"),
                            });
                        };
                        query.expand.push((*known).to_string());
                    }
                }
                "count" => {
                    query.count = match value.to_ascii_lowercase().as_str() {
                        "true" => true,
                        "false" => false,
                        _ => {
                            return Err(QueryError::Option {
                                option: "$count",
                                message: format!("expected true or false, got '{value}'"),
                            });
                        }
                    }
                }
                _ => return Err(QueryError::Unknown(key.clone())),
            }
        }

        Ok(query)
    }

    /// Filter, count, sort, page, then shape the rows.
    ///
    /// Relations listed in `expandable` but not requested via `$expand` are
    /// removed from every row.
    #[must_use]
    pub fn apply(&self, rows: Vec<Value>, expandable: &[&str]) -> Collection {
        let mut rows: Vec<Value> = match &self.filter {
            Some(expr) => rows.into_iter().filter(|row| expr.matches(row)).collect(),
            None => rows,
        };
        let total = rows.len();

        if !self.order_by.is_empty() {
            rows.sort_by(|a, b| {
                self.order_by.iter().fold(Ordering::Equal, |acc, key| {
                    acc.then_with(|| {
                        let ordering = compare_values(
                            lookup(a, &key.field).unwrap_or(&Value::Null),
                            lookup(b, &key.field).unwrap_or(&Value::Null),
                        );
                        if key.descending { ordering.reverse() } else { ordering }
                    })
                })
            });
        }

        let value = rows
            .into_iter()
            .skip(self.skip)
            .take(self.top)
            .map(|row| self.shape(row, expandable))
            .collect();

        Collection {
            value,
            count: self.count.then_some(total),
        }
    }

    fn shape(&self, row: Value, expandable: &[&str]) -> Value {
        let Value::Object(mut object) = row else {
            return row;
        };

        for relation in expandable {
            if !self.expand.iter().any(|e| e == relation) {
                object.remove(*relation);
            }
        }

        if let Some(select) = &self.select {
            let keep: Map<String, Value> = object
                .into_iter()
                .filter(|(key, _)| {
                    self.expand.iter().any(|e| e == key)
                        || select.iter().any(|s| s.eq_ignore_ascii_case(key))
                })
                .collect();
            return Value::Object(keep);
        }

        Value::Object(object)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_count(option: &'static str, value: &str) -> Result<usize, QueryError> {
    value.trim().parse::<usize>().map_err(|_| QueryError::Option {
        option,
        message: format!("expected a non-negative integer, got '{value}'"),
    })
}

fn parse_order_by(value: &str) -> Result<Vec<OrderKey>, QueryError> {
    split_list(value)
        .into_iter()
        .map(|item| {
            let mut parts = item.split_whitespace();
            let field = parts.next().unwrap_or_default().to_string();
            let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => false,
                Some("desc") => true,
                Some(other) => {
                    return Err(QueryError::Option {
                        option: "$orderby",
                        message: format!("unknown direction '{other}'"),
                    });
                }
            };
            if parts.next().is_some() {
                return Err(QueryError::Option {
                    option: "$orderby",
                    message: format!("unexpected text in '{item}'"),
                });
            }
            Ok(OrderKey { field, descending })
        })
        .collect()
}

/// Resolve a `/`-separated field path, matching keys case-insensitively.
pub(crate) fn lookup<'v>(row: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('/').try_fold(row, |current, segment| {
        let Value::Object(object) = current else {
            return None;
        };
        object.get(segment).or_else(|| {
            object
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(segment))
                .map(|(_, value)| value)
        })
    })
}

/// Total order over JSON values: null < bool < number < string < other.
/// Strings compare case-insensitively first.
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    const fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()).then_with(|| x.cmp(y)),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn rows() -> Vec<Value> {
        (1..=5)
            .map(|i| {
                json!({
                    "tagId": i,
                    "tagName": format!("tag-{}", 6 - i),
                    "deletable": i % 2 == 0,
                    "tags": [],
                })
            })
            .collect()
    }

    #[test]
    fn test_defaults() {
        let query = ListQuery::parse(&HashMap::new(), &[]).unwrap();
        assert_eq!(query, ListQuery::default());
        assert_eq!(query.top, MAX_TOP);
    }

    #[test]
    fn test_top_is_clamped() {
        let query = ListQuery::parse(&params(&[("$top", "500")]), &[]).unwrap();
        assert_eq!(query.top, 100);
    }

    #[test]
    fn test_non_dollar_params_are_ignored() {
        assert!(ListQuery::parse(&params(&[("startDate", "2024-01-01")]), &[]).is_ok());
    }

    #[test]
    fn test_invalid_options() {
        assert!(ListQuery::parse(&params(&[("$top", "-1")]), &[]).is_err());
        assert!(ListQuery::parse(&params(&[("$count", "maybe")]), &[]).is_err());
        assert!(ListQuery::parse(&params(&[("$orderby", "tagName sideways")]), &[]).is_err());
        assert!(ListQuery::parse(&params(&[("$expand", "author")]), &["tags"]).is_err());
        assert!(ListQuery::parse(&params(&[("$search", "x")]), &[]).is_err());
    }

    #[test]
    fn test_filter_order_page_and_count() {
        let query = ListQuery::parse(
            &params(&[
                ("$filter", "tagId gt 1"),
                ("$orderby", "TagName asc"),
                ("$skip", "1"),
                ("$top", "2"),
                ("$count", "true"),
            ]),
            &[],
        )
        .unwrap();
        let result = query.apply(rows(), &[]);

        assert_eq!(result.count, Some(4));
        let names: Vec<_> = result.value.iter().map(|r| r["tagName"].clone()).collect();
        assert_eq!(names, vec![json!("tag-2"), json!("tag-3")]);
    }

    #[test]
    fn test_multi_key_order() {
        let query = ListQuery::parse(&params(&[("$orderby", "deletable desc, tagId desc")]), &[]).unwrap();
        let ids: Vec<_> = query
            .apply(rows(), &[])
            .value
            .iter()
            .map(|r| r["tagId"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![4, 2, 5, 3, 1]);
    }

    #[test]
    fn test_select_and_expand() {
        let plain = ListQuery::parse(&params(&[("$select", "tagid")]), &["tags"]).unwrap();
        let row = &plain.apply(rows(), &["tags"]).value[0];
        assert_eq!(row, &json!({"tagId": 1}));

        let expanded =
            ListQuery::parse(&params(&[("$select", "tagId"), ("$expand", "Tags")]), &["tags"]).unwrap();
        let row = &expanded.apply(rows(), &["tags"]).value[0];
        assert_eq!(row, &json!({"tagId": 1, "tags": []}));
    }

    #[test]
    fn test_lookup_nested_path() {
        let row = json!({"category": {"categoryName": "World"}});
        assert_eq!(lookup(&row, "Category/CategoryName"), Some(&json!("World")));
        assert_eq!(lookup(&row, "category/missing"), None);
    }
}
