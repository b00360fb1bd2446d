// handlers/protected/leaderboard.rs - /leaderboard/students/* and /leaderboard/classes/*

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::api::format::{number_at, to_public};
use crate::database::{Document, ID_FIELD};
use crate::error::ApiError;
use crate::handlers::protected::students::{StudentQuery, STUDENTS_COLLECTION};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, QueryParams};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 10;

/// Which performance figure students are ranked by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "xpPoints")]
    XpPoints,
    #[serde(rename = "accuracyPercentage", alias = "accuracy")]
    Accuracy,
    #[serde(rename = "lessonsCompleted", alias = "lessons")]
    Lessons,
}

impl SortBy {
    fn path(&self) -> &'static str {
        match self {
            SortBy::XpPoints => "performance.xpPoints",
            SortBy::Accuracy => "performance.accuracyPercentage",
            SortBy::Lessons => "performance.lessonsCompleted",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
    pub school_id: Option<String>,
    pub class: Option<String>,
    #[serde(default)]
    pub sort_by: SortBy,
}

impl LeaderboardQuery {
    fn students(&self) -> StudentQuery {
        StudentQuery {
            school_id: self.school_id.clone(),
            class: self.class.clone(),
        }
    }
}

/// Highest score first; students without the figure sort last. Ties keep
/// insertion order.
pub fn rank(mut students: Vec<Document>, sort_by: SortBy) -> Vec<Document> {
    let path = sort_by.path();
    students.sort_by(|a, b| {
        let (a, b) = (number_at(a, path), number_at(b, path));
        match (a, b) {
            (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    students
}

/// Resolves a `limit` query value: 10 when absent, capped at the page size,
/// and a 400 for zero.
pub fn capped_limit(limit: Option<usize>, max_page_size: u32) -> Result<usize, ApiError> {
    match limit {
        Some(0) => Err(ApiError::bad_request("limit must be a positive integer")),
        Some(n) => Ok(n.min(max_page_size as usize)),
        None => Ok(DEFAULT_LIMIT),
    }
}

async fn top_entries(state: &AppState, query: &LeaderboardQuery) -> Result<Vec<Value>, ApiError> {
    let limit = capped_limit(query.limit, state.config.api.max_page_size)?;

    let store = state.store().await?;
    let students = store.find(STUDENTS_COLLECTION, &query.students().filter()).await?;

    Ok(rank(students, query.sort_by)
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, student)| {
            let mut entry = to_public(student);
            if let Value::Object(map) = &mut entry {
                map.insert("rank".to_string(), Value::from(i + 1));
            }
            entry
        })
        .collect())
}

/// GET /leaderboard/students/top
pub async fn top_students_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(query): QueryParams<LeaderboardQuery>,
) -> ApiResult<Vec<Value>> {
    Ok(ApiResponse::success(top_entries(&state, &query).await?))
}

/// GET /leaderboard/classes/:class_name - the top students of one class. The
/// path wins over any `class` query value.
pub async fn class_leaderboard_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(class_name): Path<String>,
    QueryParams(mut query): QueryParams<LeaderboardQuery>,
) -> ApiResult<Vec<Value>> {
    query.class = Some(class_name);
    Ok(ApiResponse::success(top_entries(&state, &query).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRank {
    pub rank: usize,
    pub total_students: usize,
    /// Share of the field ranked at or below this student, 0-100.
    pub percentile: f64,
}

/// GET /leaderboard/students/:id/rank
pub async fn student_rank_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<LeaderboardQuery>,
) -> ApiResult<StudentRank> {
    let store = state.store().await?;
    let students = store.find(STUDENTS_COLLECTION, &query.students().filter()).await?;
    let total_students = students.len();

    let position = rank(students, query.sort_by)
        .iter()
        .position(|s| s.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
        .ok_or_else(|| ApiError::not_found("Student not found"))?;

    let rank = position + 1;
    let percentile = ((total_students - position) as f64 / total_students as f64 * 1000.0).round() / 10.0;

    Ok(ApiResponse::success(StudentRank {
        rank,
        total_students,
        percentile,
    }))
}
