//! List query construction: filter, search, order, paginate
//!
//! Each entity declares a [`ListSpec`]: its SELECT/COUNT statements, the
//! allow-listed filter parameters, the text columns reachable by `search`,
//! and the ordering allow-list with a default. Handlers hand the raw query
//! string map to [`fetch_page`], which runs a COUNT plus a page fetch,
//! both assembled with bind parameters.
//!
//! Error policy: unknown query keys are ignored; malformed values into a
//! typed filter (non-numeric number, unparsable datetime) are rejected.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracker_common::{Error, Result};

use crate::pagination::{self, Page, DEFAULT_PAGE_SIZE};

/// How a filter parameter translates to a WHERE condition
#[derive(Debug, Clone, Copy)]
pub enum FilterKind {
    /// Exact text match
    Exact,
    /// Case-insensitive exact text match (enum-like fields)
    ExactCi,
    /// Inclusive float lower bound
    FloatMin,
    /// Inclusive float upper bound
    FloatMax,
    /// Inclusive integer lower bound
    IntMin,
    /// Inclusive integer upper bound
    IntMax,
    /// Inclusive datetime lower bound
    DateMin,
    /// Inclusive datetime upper bound
    DateMax,
}

/// One allow-listed filter parameter
#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
}

/// Declarative list contract for one entity
pub struct ListSpec {
    /// SELECT statement without WHERE/ORDER BY/LIMIT
    pub select: &'static str,
    /// COUNT statement over the same FROM clause
    pub count: &'static str,
    pub filters: &'static [FilterField],
    /// Columns reachable by the free-text `search` parameter
    pub search_columns: &'static [&'static str],
    /// `ordering` parameter allow-list: (param name, column expression)
    pub ordering_fields: &'static [(&'static str, &'static str)],
    /// Natural ordering applied when no valid `ordering` is supplied
    pub default_order: &'static str,
}

/// A single WHERE condition with its bind value
enum Cond {
    Eq(&'static str, String),
    EqCi(&'static str, String),
    FloatGe(&'static str, f64),
    FloatLe(&'static str, f64),
    IntGe(&'static str, i64),
    IntLe(&'static str, i64),
    DateGe(&'static str, DateTime<Utc>),
    DateLe(&'static str, DateTime<Utc>),
    /// Substring match OR'd across the entity's search columns
    Search(&'static [&'static str], String),
}

fn parse_float(param: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| Error::InvalidInput(format!("{} must be a number", param)))
}

fn parse_int(param: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| Error::InvalidInput(format!("{} must be an integer", param)))
}

fn parse_datetime(param: &str, value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(Error::InvalidInput(format!(
        "{} must be an RFC 3339 datetime or YYYY-MM-DD date",
        param
    )))
}

/// Translate the raw query map into WHERE conditions per the entity spec.
fn conditions(spec: &ListSpec, params: &HashMap<String, String>) -> Result<Vec<Cond>> {
    let mut conds = Vec::new();

    for field in spec.filters {
        let Some(raw) = params.get(field.param) else {
            continue;
        };

        let cond = match field.kind {
            FilterKind::Exact => Cond::Eq(field.column, raw.clone()),
            FilterKind::ExactCi => Cond::EqCi(field.column, raw.clone()),
            FilterKind::FloatMin => Cond::FloatGe(field.column, parse_float(field.param, raw)?),
            FilterKind::FloatMax => Cond::FloatLe(field.column, parse_float(field.param, raw)?),
            FilterKind::IntMin => Cond::IntGe(field.column, parse_int(field.param, raw)?),
            FilterKind::IntMax => Cond::IntLe(field.column, parse_int(field.param, raw)?),
            FilterKind::DateMin => Cond::DateGe(field.column, parse_datetime(field.param, raw)?),
            FilterKind::DateMax => Cond::DateLe(field.column, parse_datetime(field.param, raw)?),
        };
        conds.push(cond);
    }

    if let Some(term) = params.get("search") {
        if !term.is_empty() && !spec.search_columns.is_empty() {
            conds.push(Cond::Search(spec.search_columns, term.clone()));
        }
    }

    Ok(conds)
}

fn push_where(qb: &mut QueryBuilder<'_, Sqlite>, conds: &[Cond]) {
    for (i, cond) in conds.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });

        match cond {
            Cond::Eq(col, v) => {
                qb.push(*col).push(" = ").push_bind(v.clone());
            }
            Cond::EqCi(col, v) => {
                qb.push("LOWER(")
                    .push(*col)
                    .push(") = LOWER(")
                    .push_bind(v.clone())
                    .push(")");
            }
            Cond::FloatGe(col, v) => {
                qb.push(*col).push(" >= ").push_bind(*v);
            }
            Cond::FloatLe(col, v) => {
                qb.push(*col).push(" <= ").push_bind(*v);
            }
            Cond::IntGe(col, v) => {
                qb.push(*col).push(" >= ").push_bind(*v);
            }
            Cond::IntLe(col, v) => {
                qb.push(*col).push(" <= ").push_bind(*v);
            }
            Cond::DateGe(col, v) => {
                qb.push(*col).push(" >= ").push_bind(*v);
            }
            Cond::DateLe(col, v) => {
                qb.push(*col).push(" <= ").push_bind(*v);
            }
            Cond::Search(cols, term) => {
                let pattern = format!("%{}%", term);
                qb.push("(");
                for (j, col) in cols.iter().enumerate() {
                    if j > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*col).push(" LIKE ").push_bind(pattern.clone());
                }
                qb.push(")");
            }
        }
    }
}

/// Resolve the ORDER BY clause from the `ordering` parameter.
///
/// `ordering=field` sorts ascending, `ordering=-field` descending. Field
/// names outside the allow-list fall back to the entity's natural order.
fn order_clause(spec: &ListSpec, params: &HashMap<String, String>) -> String {
    if let Some(raw) = params.get("ordering") {
        let (name, direction) = match raw.strip_prefix('-') {
            Some(rest) => (rest, "DESC"),
            None => (raw.as_str(), "ASC"),
        };

        for (param, column) in spec.ordering_fields {
            if *param == name {
                return format!("{} {}", column, direction);
            }
        }
    }

    spec.default_order.to_string()
}

/// Parse `page` and `page_size`, applying the default and the hard ceiling.
fn page_params(params: &HashMap<String, String>) -> Result<(i64, i64)> {
    let page = match params.get("page") {
        Some(raw) => parse_int("page", raw)?,
        None => 1,
    };
    let page_size = match params.get("page_size") {
        Some(raw) => pagination::clamp_page_size(parse_int("page_size", raw)?),
        None => DEFAULT_PAGE_SIZE,
    };
    Ok((page, page_size))
}

/// Run a full list query: COUNT over the filtered set, then fetch one page.
pub async fn fetch_page<T>(
    pool: &SqlitePool,
    spec: &ListSpec,
    params: &HashMap<String, String>,
) -> Result<Page<T>>
where
    T: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
{
    let conds = conditions(spec, params)?;
    let (page, page_size) = page_params(params)?;

    let mut count_qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(spec.count);
    push_where(&mut count_qb, &conds);
    let count: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let window = pagination::window(count, page, page_size);

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(spec.select);
    push_where(&mut qb, &conds);
    qb.push(" ORDER BY ")
        .push(order_clause(spec, params))
        .push(" LIMIT ")
        .push_bind(page_size)
        .push(" OFFSET ")
        .push_bind(window.offset);

    let results = qb.build_query_as::<T>().fetch_all(pool).await?;

    Ok(Page::new(count, window, results))
}

#[cfg(test)]
mod tests {
    use super::*;

    static SPEC: ListSpec = ListSpec {
        select: "SELECT * FROM targets",
        count: "SELECT COUNT(*) FROM targets",
        filters: &[
            FilterField {
                param: "status",
                column: "status",
                kind: FilterKind::ExactCi,
            },
            FilterField {
                param: "priority_min",
                column: "priority",
                kind: FilterKind::IntMin,
            },
            FilterField {
                param: "confidence_max",
                column: "confidence",
                kind: FilterKind::FloatMax,
            },
            FilterField {
                param: "created_at_min",
                column: "created_at",
                kind: FilterKind::DateMin,
            },
        ],
        search_columns: &["name", "description", "tags"],
        ordering_fields: &[("priority", "priority"), ("updated_at", "updated_at")],
        default_order: "updated_at DESC, priority DESC, confidence DESC",
    };

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unknown_filter_keys_ignored() {
        let conds = conditions(&SPEC, &params(&[("bogus", "1"), ("also_bogus", "x")])).unwrap();
        assert!(conds.is_empty());
    }

    #[test]
    fn test_malformed_numeric_filter_rejected() {
        assert!(conditions(&SPEC, &params(&[("priority_min", "abc")])).is_err());
        assert!(conditions(&SPEC, &params(&[("confidence_max", "high")])).is_err());
    }

    #[test]
    fn test_malformed_datetime_filter_rejected() {
        assert!(conditions(&SPEC, &params(&[("created_at_min", "yesterday")])).is_err());
    }

    #[test]
    fn test_date_only_filter_accepted() {
        let conds = conditions(&SPEC, &params(&[("created_at_min", "2026-01-15")])).unwrap();
        assert_eq!(conds.len(), 1);
    }

    #[test]
    fn test_where_clause_shape() {
        let conds = conditions(
            &SPEC,
            &params(&[("status", "NEW"), ("priority_min", "1"), ("search", "alpha")]),
        )
        .unwrap();

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SPEC.select);
        push_where(&mut qb, &conds);
        let sql = qb.sql();

        assert!(sql.contains("WHERE"));
        assert!(sql.contains("LOWER(status) = LOWER("));
        assert!(sql.contains("priority >= "));
        assert!(sql.contains("name LIKE "));
        assert!(sql.contains(" OR description LIKE "));
    }

    #[test]
    fn test_no_conditions_no_where() {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SPEC.select);
        push_where(&mut qb, &[]);
        assert!(!qb.sql().contains("WHERE"));
    }

    #[test]
    fn test_ordering_ascending_and_descending() {
        assert_eq!(
            order_clause(&SPEC, &params(&[("ordering", "priority")])),
            "priority ASC"
        );
        assert_eq!(
            order_clause(&SPEC, &params(&[("ordering", "-priority")])),
            "priority DESC"
        );
    }

    #[test]
    fn test_ordering_outside_allow_list_falls_back() {
        assert_eq!(
            order_clause(&SPEC, &params(&[("ordering", "confidence; DROP TABLE targets")])),
            SPEC.default_order
        );
        assert_eq!(order_clause(&SPEC, &params(&[])), SPEC.default_order);
    }

    #[test]
    fn test_page_params_defaults_and_cap() {
        let (page, size) = page_params(&params(&[])).unwrap();
        assert_eq!((page, size), (1, 20));

        let (_, size) = page_params(&params(&[("page_size", "500")])).unwrap();
        assert_eq!(size, 200);

        assert!(page_params(&params(&[("page", "two")])).is_err());
    }
}
