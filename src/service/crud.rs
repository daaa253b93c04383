//! Generic CRUD execution against PostgreSQL. One implementation serves all
//! six entities; rows come back as JSON objects in catalog column order.

use crate::catalog::EntityDef;
use crate::error::AppError;
use crate::sql::{self, QueryBuf, SearchFilter};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// One page of rows plus the total size of the filtered set.
    pub async fn list(
        pool: &PgPool,
        def: &EntityDef,
        filter: Option<&SearchFilter>,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<Value>, u64), AppError> {
        let q = sql::select_page(def, filter, limit, offset);
        let rows = Self::fetch_all(pool, &q).await?;

        let c = sql::count(def, filter);
        tracing::debug!(sql = %c.sql, "query");
        let mut count_query = sqlx::query_scalar::<_, i64>(&c.sql);
        for p in c.params {
            count_query = count_query.bind(p);
        }
        let total = count_query.fetch_one(pool).await?;
        Ok((rows, total.max(0) as u64))
    }

    /// Fetch one row by id, or None.
    pub async fn get(pool: &PgPool, def: &EntityDef, id: i64) -> Result<Option<Value>, AppError> {
        let q = sql::select_by_id(def, id);
        Self::fetch_optional(pool, &q).await
    }

    /// Insert a validated body and return the created row.
    pub async fn create(
        pool: &PgPool,
        def: &EntityDef,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let q = sql::insert(def, body);
        let row = Self::fetch_optional(pool, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tracing::info!(table = def.table, "record created");
        Ok(row)
    }

    /// Update by id with a validated body. None when the id does not exist.
    pub async fn update(
        pool: &PgPool,
        def: &EntityDef,
        id: i64,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::update(def, id, body);
        let row = Self::fetch_optional(pool, &q).await?;
        if row.is_some() {
            tracing::info!(table = def.table, id, "record updated");
        }
        Ok(row)
    }

    /// Delete by id, returning the removed row. None when the id does not
    /// exist; a foreign-key violation surfaces as `AppError::Constraint`.
    pub async fn delete(
        pool: &PgPool,
        def: &EntityDef,
        id: i64,
    ) -> Result<Option<Value>, AppError> {
        let q = sql::delete(def, id);
        let row = Self::fetch_optional(pool, &q).await?;
        if row.is_some() {
            tracing::info!(table = def.table, id, "record deleted");
        }
        Ok(row)
    }

    async fn fetch_all(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Decode a cell by probing the types the schema actually uses: bigint ids,
/// text fields, and timestamptz audit columns.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    Value::Null
}
