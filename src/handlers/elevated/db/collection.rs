// handlers/elevated/db/collection.rs - GET/POST /admin/db/:collection

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::format::{timestamp, to_public, to_public_list};
use crate::error::ApiError;
use crate::filter::{parse_where, validate_collection_name, FilterData, Pagination};
use crate::handlers::utils::object_body;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, QueryParams, SuperAdmin};
use crate::state::AppState;

/// Raw listing parameters. Numbers stay strings so bad input gets our own 400.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Page {
    pub data: Vec<Value>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl ListQuery {
    fn filter(&self) -> Result<FilterData, ApiError> {
        let mut filter = FilterData::new();
        if let Some(raw) = self.where_clause.as_deref().filter(|s| !s.trim().is_empty()) {
            filter.where_clause = Some(parse_where(raw)?);
        }
        if let Some(q) = &self.q {
            filter = filter.search(q.as_str());
        }
        Ok(filter)
    }
}

/**
 * GET /admin/db/:collection - One page of raw documents
 *
 * Query: `page` (1-based), `limit` (capped by config), `q` (free text),
 * `where` (JSON object, containment match).
 * Output: `{ "data": [...], "total": n, "page": p, "limit": l }`
 */
pub async fn collection_get(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Path(collection): Path<String>,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Page> {
    validate_collection_name(&collection)?;

    let api = &state.config.api;
    let pagination = Pagination::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        api.default_page_size,
        api.max_page_size,
    )?;
    let filter = query.filter()?;

    let store = state.store().await?;
    let total = store.count(&collection, &filter).await?;
    let documents = store.find(&collection, &pagination.apply(filter)).await?;

    Ok(ApiResponse::success(Page {
        data: to_public_list(documents),
        total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// POST /admin/db/:collection - insert a raw document, stamping `createdAt` if absent.
pub async fn collection_post(
    State(state): State<AppState>,
    SuperAdmin(claims): SuperAdmin,
    Path(collection): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<Value> {
    validate_collection_name(&collection)?;

    let mut document = object_body(body)?;
    let now = timestamp();
    document.entry("createdAt").or_insert_with(|| now.clone());
    document.insert("updatedAt".to_string(), now);

    let store = state.store().await?;
    let id = store.insert(&collection, document).await?;
    info!(collection = %collection, id = %id, by = %claims.user_id, "document inserted");

    let created = store
        .find_one(&collection, &id)
        .await?
        .ok_or_else(|| ApiError::internal("Document insert", "created document not readable"))?;
    Ok(ApiResponse::created(to_public(created)))
}
