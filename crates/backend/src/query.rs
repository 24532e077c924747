//! Row selection: equality filters, ordering and a limit.

use std::cmp::Ordering;

use forgepilot_core::Record;
use serde_json::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// A table read.
///
/// ```
/// use forgepilot_backend::Query;
///
/// let q = Query::new().eq("slug", "acme").order_by("position").limit(1);
/// assert_eq!(
///     q.to_params(),
///     vec![
///         ("select".to_string(), "*".to_string()),
///         ("slug".to_string(), "eq.acme".to_string()),
///         ("order".to_string(), "position.asc".to_string()),
///         ("limit".to_string(), "1".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<(String, String)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The default read for a record type, ordered by its `ORDER_BY` column.
    #[must_use]
    pub fn for_record<T: Record>() -> Self {
        let query = Self::new();
        match T::ORDER_BY {
            Some(column) if T::DESCENDING => query.order_by_desc(column),
            Some(column) => query.order_by(column),
            None => query,
        }
    }

    /// Keep rows whose `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl ToString) -> Self {
        self.filters.push((column.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), Direction::Asc));
        self
    }

    #[must_use]
    pub fn order_by_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some((column.into(), Direction::Desc));
        self
    }

    #[must_use]
    pub const fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    #[must_use]
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    #[must_use]
    pub const fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    /// Render as PostgREST query parameters.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{value}")));
        }
        if let Some((column, direction)) = &self.order {
            let dir = match direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            params.push(("order".to_string(), format!("{column}.{dir}")));
        }
        if let Some(n) = self.limit {
            params.push(("limit".to_string(), n.to_string()));
        }
        params
    }

    /// Whether a row passes every filter. Used by the in-memory backend.
    #[must_use]
    pub fn matches(&self, row: &serde_json::Map<String, Value>) -> bool {
        self.filters.iter().all(|(column, expected)| {
            row.get(column)
                .is_some_and(|actual| value_as_text(actual) == *expected)
        })
    }

    /// Order rows in place per this query's ordering. Used by the in-memory backend.
    pub fn sort(&self, rows: &mut [serde_json::Map<String, Value>]) {
        if let Some((column, direction)) = &self.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(column), b.get(column));
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// Nulls sort first, numbers numerically, everything else by text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => value_as_text(x).cmp(&value_as_text(y)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use forgepilot_core::{AdminCredential, Post, Service};
    use serde_json::json;

    use super::*;

    fn row(v: Value) -> serde_json::Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_for_record_ordering() {
        assert!(
            Query::for_record::<Service>()
                .to_params()
                .contains(&("order".into(), "position.asc".into()))
        );
        assert!(
            Query::for_record::<Post>()
                .to_params()
                .contains(&("order".into(), "published_at.desc".into()))
        );
        assert_eq!(Query::for_record::<AdminCredential>().to_params().len(), 1);
    }

    #[test]
    fn test_matches_compares_text() {
        let q = Query::new().eq("visible", true).eq("key", "hero");
        assert!(q.matches(&row(json!({"key": "hero", "visible": true}))));
        assert!(!q.matches(&row(json!({"key": "cta", "visible": true}))));
        assert!(!q.matches(&row(json!({"key": "hero"}))));
    }

    #[test]
    fn test_sort_numbers_and_nulls() {
        let mut rows = vec![
            row(json!({"position": 10})),
            row(json!({"position": null})),
            row(json!({"position": 2})),
        ];
        Query::new().order_by("position").sort(&mut rows);
        assert_eq!(rows[0]["position"], Value::Null);
        assert_eq!(rows[1]["position"], 2);
        assert_eq!(rows[2]["position"], 10);

        Query::new().order_by_desc("position").sort(&mut rows);
        assert_eq!(rows[0]["position"], 10);
    }
}
