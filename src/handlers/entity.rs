//! Entity CRUD handlers. One set of handlers serves all six entities; the
//! path segment selects the catalog entry.

use crate::catalog::{self, EntityDef, Search};
use crate::error::AppError;
use crate::response::{ActionBody, Page};
use crate::service::{validate, CrudService};
use crate::sql::SearchFilter;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

const DEFAULT_PER_PAGE: u32 = 10;
const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn resolve(segment: &str) -> Result<&'static EntityDef, AppError> {
    catalog::by_path(segment)
        .ok_or_else(|| AppError::NotFound(format!("no such entity: {}", segment)))
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: {}", id_str)))
}

fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m.into_iter().collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Turn the `search` query param into the entity's designated filter. A blank
/// term means no filter; a non-numeric term on an exact-match entity is a 400.
fn build_filter(def: &EntityDef, search: Option<&str>) -> Result<Option<SearchFilter>, AppError> {
    let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    Ok(Some(match def.search {
        Search::Substring(column) => SearchFilter::Substring {
            column,
            term: term.to_string(),
        },
        Search::Exact(column) => SearchFilter::Exact {
            column,
            id: term.parse().map_err(|_| {
                AppError::BadRequest(format!("search on {} must be a numeric {}", def.path, column))
            })?,
        },
    }))
}

#[tracing::instrument(skip(state, params))]
pub async fn list(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page>, AppError> {
    let def = resolve(&segment)?;
    let filter = build_filter(def, params.search.as_deref())?;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    let offset = (page - 1).saturating_mul(per_page);

    let (rows, total) =
        CrudService::list(&state.pool, def, filter.as_ref(), per_page, offset).await?;
    tracing::debug!(table = def.table, count = rows.len(), total, "listed page");
    Ok(Json(Page::new(
        def.path,
        rows,
        params.search.as_deref().map(str::trim).filter(|t| !t.is_empty()),
        page,
        per_page,
        params.per_page.is_some(),
        total,
    )))
}

#[tracing::instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let def = resolve(&segment)?;
    let id = parse_id(&id_str)?;
    let row = CrudService::get(&state.pool, def, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", def.label, id)))?;
    Ok(Json(row))
}

#[tracing::instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ActionBody>), AppError> {
    let def = resolve(&segment)?;
    let body = body_to_map(body)?;
    validate(def, &body)?;
    let row = CrudService::create(&state.pool, def, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ActionBody {
            data: row,
            message: format!("{} created successfully.", def.label),
        }),
    ))
}

#[tracing::instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<ActionBody>, AppError> {
    let def = resolve(&segment)?;
    let id = parse_id(&id_str)?;
    let body = body_to_map(body)?;
    validate(def, &body)?;
    let row = CrudService::update(&state.pool, def, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", def.label, id)))?;
    Ok(Json(ActionBody {
        data: row,
        message: format!("{} updated successfully.", def.label),
    }))
}

#[tracing::instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path((segment, id_str)): Path<(String, String)>,
) -> Result<Json<ActionBody>, AppError> {
    let def = resolve(&segment)?;
    let id = parse_id(&id_str)?;
    let row = CrudService::delete(&state.pool, def, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", def.label, id)))?;
    Ok(Json(ActionBody {
        data: row,
        message: format!("{} deleted successfully.", def.label),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AUTHOR, LOAN};

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("abc").is_err());
        assert!(parse_id("").is_err());
    }

    #[test]
    fn blank_search_means_no_filter() {
        assert!(build_filter(&AUTHOR, None).unwrap().is_none());
        assert!(build_filter(&AUTHOR, Some("   ")).unwrap().is_none());
    }

    #[test]
    fn substring_entities_take_any_term() {
        let filter = build_filter(&AUTHOR, Some("orw")).unwrap().unwrap();
        assert!(matches!(
            filter,
            SearchFilter::Substring { column: "name", .. }
        ));
    }

    #[test]
    fn loan_search_requires_a_numeric_book_id() {
        let filter = build_filter(&LOAN, Some("7")).unwrap().unwrap();
        assert!(matches!(filter, SearchFilter::Exact { column: "book_id", id: 7 }));
        assert!(matches!(
            build_filter(&LOAN, Some("orwell")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(body_to_map(serde_json::json!(["a"])).is_err());
        assert!(body_to_map(serde_json::json!({"name": "x"})).is_ok());
    }
}
