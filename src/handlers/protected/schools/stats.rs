// handlers/protected/schools/stats.rs - GET /schools/stats

use axum::extract::State;
use serde::Serialize;

use super::SCHOOLS_COLLECTION;
use crate::database::DocumentStore;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult, SuperAdmin};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolStats {
    pub total_schools: u64,
    pub active_schools: u64,
}

pub async fn school_stats_get(State(state): State<AppState>, _admin: SuperAdmin) -> ApiResult<SchoolStats> {
    let store = state.store().await?;
    Ok(ApiResponse::success(school_stats(store.as_ref()).await?))
}

pub(crate) async fn school_stats(store: &dyn DocumentStore) -> Result<SchoolStats, ApiError> {
    let total_schools = store.count(SCHOOLS_COLLECTION, &FilterData::new()).await?;
    let active_schools = store
        .count(SCHOOLS_COLLECTION, &FilterData::new().where_eq("status", "active"))
        .await?;

    Ok(SchoolStats {
        total_schools,
        active_schools,
    })
}
