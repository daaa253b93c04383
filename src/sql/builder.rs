//! Builds parameterized SELECT, COUNT, INSERT, UPDATE, DELETE from the entity
//! catalog. Column order follows the catalog; writable fields follow the
//! entity's rule order so statements are deterministic.

use crate::catalog::{ColumnKind, EntityDef};
use crate::sql::PgBindValue;
use serde_json::Value;
use std::collections::HashMap;

/// Quote an identifier for PostgreSQL. Needed because `locations` has columns
/// named `row` and `column`.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn cast(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::BigInt => "::bigint",
        ColumnKind::Text => "::text",
        ColumnKind::Timestamp => "::timestamptz",
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a bind value, returning its 1-based placeholder number.
    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// Active list filter, already parsed by the handler.
#[derive(Clone, Debug)]
pub enum SearchFilter {
    /// `col ILIKE '%term%'`, case-insensitive.
    Substring { column: &'static str, term: String },
    /// `col = id`, for the loan list filtered by book.
    Exact { column: &'static str, id: i64 },
}

fn select_column_list(def: &EntityDef) -> String {
    def.columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn where_clause(q: &mut QueryBuf, filter: Option<&SearchFilter>) -> String {
    match filter {
        None => String::new(),
        Some(SearchFilter::Substring { column, term }) => {
            let n = q.push_param(PgBindValue::Text(format!("%{}%", term)));
            format!(" WHERE {} ILIKE ${}::text", quoted(column), n)
        }
        Some(SearchFilter::Exact { column, id }) => {
            let n = q.push_param(PgBindValue::from(*id));
            format!(" WHERE {} = ${}::bigint", quoted(column), n)
        }
    }
}

/// One page of rows, ordered by id (insertion order).
pub fn select_page(
    def: &EntityDef,
    filter: Option<&SearchFilter>,
    limit: u32,
    offset: u32,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, filter);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY \"id\" LIMIT {} OFFSET {}",
        select_column_list(def),
        quoted(def.table),
        where_sql,
        limit,
        offset
    );
    q
}

/// Size of the filtered set, for pagination links.
pub fn count(def: &EntityDef, filter: Option<&SearchFilter>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&mut q, filter);
    q.sql = format!("SELECT COUNT(*) FROM {}{}", quoted(def.table), where_sql);
    q
}

pub fn select_by_id(def: &EntityDef, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::from(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE \"id\" = ${}::bigint",
        select_column_list(def),
        quoted(def.table),
        n
    );
    q
}

/// INSERT from a validated body: rule fields present in the body, in rule
/// order. RETURNING the full column set.
pub fn insert(def: &EntityDef, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for rule in def.rules {
        let Some(v) = body.get(rule.field) else { continue };
        let kind = def
            .column(rule.field)
            .map(|c| c.kind)
            .unwrap_or(ColumnKind::Text);
        let n = q.push_param(PgBindValue::from_json(v));
        cols.push(quoted(rule.field));
        placeholders.push(format!("${}{}", n, cast(kind)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(def.table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(def)
    );
    q
}

/// UPDATE by id: SET rule fields present in the body, bump `updated_at`.
pub fn update(def: &EntityDef, id: i64, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for rule in def.rules {
        let Some(v) = body.get(rule.field) else { continue };
        let kind = def
            .column(rule.field)
            .map(|c| c.kind)
            .unwrap_or(ColumnKind::Text);
        let n = q.push_param(PgBindValue::from_json(v));
        sets.push(format!("{} = ${}{}", quoted(rule.field), n, cast(kind)));
    }
    sets.push("\"updated_at\" = NOW()".to_string());
    let id_param = q.push_param(PgBindValue::from(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE \"id\" = ${}::bigint RETURNING {}",
        quoted(def.table),
        sets.join(", "),
        id_param,
        select_column_list(def)
    );
    q
}

pub fn delete(def: &EntityDef, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::from(id));
    q.sql = format!(
        "DELETE FROM {} WHERE \"id\" = ${}::bigint RETURNING {}",
        quoted(def.table),
        n,
        select_column_list(def)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AUTHOR, LOAN, LOCATION};
    use serde_json::json;

    #[test]
    fn page_without_filter_orders_by_id() {
        let q = select_page(&AUTHOR, None, 10, 20);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"created_at\", \"updated_at\" FROM \"authors\" \
             ORDER BY \"id\" LIMIT 10 OFFSET 20"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn substring_search_uses_ilike_with_wrapped_term() {
        let filter = SearchFilter::Substring {
            column: "name",
            term: "orw".into(),
        };
        let q = select_page(&AUTHOR, Some(&filter), 10, 0);
        assert!(q.sql.contains("WHERE \"name\" ILIKE $1::text"));
        assert_eq!(q.params, vec![PgBindValue::Text("%orw%".into())]);
    }

    #[test]
    fn exact_search_matches_numeric_column() {
        let filter = SearchFilter::Exact {
            column: "book_id",
            id: 7,
        };
        let q = select_page(&LOAN, Some(&filter), 10, 0);
        assert!(q.sql.contains("WHERE \"book_id\" = $1::bigint"));
        assert_eq!(q.params, vec![PgBindValue::Text("7".into())]);
    }

    #[test]
    fn count_reuses_the_filter() {
        let filter = SearchFilter::Substring {
            column: "shelf",
            term: "A".into(),
        };
        let q = count(&LOCATION, Some(&filter));
        assert_eq!(q.sql, "SELECT COUNT(*) FROM \"locations\" WHERE \"shelf\" ILIKE $1::text");
    }

    #[test]
    fn insert_quotes_reserved_column_names() {
        let body: HashMap<String, Value> = [
            ("shelf".to_string(), json!("A")),
            ("row".to_string(), json!("3")),
            ("column".to_string(), json!("2")),
        ]
        .into();
        let q = insert(&LOCATION, &body);
        assert_eq!(
            q.sql,
            "INSERT INTO \"locations\" (\"shelf\", \"row\", \"column\") \
             VALUES ($1::text, $2::text, $3::text) \
             RETURNING \"id\", \"shelf\", \"row\", \"column\", \"created_at\", \"updated_at\""
        );
        assert_eq!(q.params.len(), 3);
    }

    #[test]
    fn update_bumps_updated_at_and_returns_the_row() {
        let body: HashMap<String, Value> = [("name".to_string(), json!("Borges"))].into();
        let q = update(&AUTHOR, 4, &body);
        assert_eq!(
            q.sql,
            "UPDATE \"authors\" SET \"name\" = $1::text, \"updated_at\" = NOW() \
             WHERE \"id\" = $2::bigint \
             RETURNING \"id\", \"name\", \"created_at\", \"updated_at\""
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn delete_returns_the_removed_row() {
        let q = delete(&AUTHOR, 4);
        assert!(q.sql.starts_with("DELETE FROM \"authors\" WHERE \"id\" = $1::bigint RETURNING"));
        assert_eq!(q.params, vec![PgBindValue::Text("4".into())]);
    }
}
