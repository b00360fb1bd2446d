// handlers/protected/students/stats.rs - GET /students/stats/overview

use axum::extract::State;
use serde::Serialize;
use serde_json::{json, Value};

use super::{StudentQuery, STUDENTS_COLLECTION};
use crate::api::format::number_at;
use crate::database::Document;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, QueryParams};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentOverview {
    pub total_students: u64,
    /// Mean of `performance.accuracyPercentage`, one decimal; 0 with no data.
    pub average_accuracy: f64,
    pub total_lessons: u64,
}

pub async fn students_overview_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(query): QueryParams<StudentQuery>,
) -> ApiResult<Value> {
    let store = state.store().await?;
    let students = store.find(STUDENTS_COLLECTION, &query.filter()).await?;
    Ok(ApiResponse::success(json!({ "overview": overview(&students) })))
}

pub fn overview(students: &[Document]) -> StudentOverview {
    StudentOverview {
        total_students: students.len() as u64,
        average_accuracy: average_accuracy(students),
        total_lessons: students
            .iter()
            .filter_map(|s| number_at(s, "performance.lessonsCompleted"))
            .map(|n| n.max(0.0) as u64)
            .sum(),
    }
}

/// Students without an accuracy figure are left out of the mean.
pub fn average_accuracy(students: &[Document]) -> f64 {
    let scores: Vec<f64> = students
        .iter()
        .filter_map(|s| number_at(s, "performance.accuracyPercentage"))
        .collect();

    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::format::into_document;

    fn student(accuracy: Option<f64>, lessons: u64) -> Document {
        match accuracy {
            Some(a) => into_document(json!({"performance": {"accuracyPercentage": a, "lessonsCompleted": lessons}})),
            None => into_document(json!({"performance": {"lessonsCompleted": lessons}})),
        }
    }

    #[test]
    fn overview_of_nothing_is_zero() {
        assert_eq!(
            overview(&[]),
            StudentOverview {
                total_students: 0,
                average_accuracy: 0.0,
                total_lessons: 0
            }
        );
    }

    #[test]
    fn averages_only_students_with_scores() {
        let students = vec![student(Some(90.0), 10), student(Some(85.0), 5), student(None, 3)];
        let summary = overview(&students);
        assert_eq!(summary.total_students, 3);
        assert_eq!(summary.average_accuracy, 87.5);
        assert_eq!(summary.total_lessons, 18);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        let students = vec![student(Some(80.0), 0), student(Some(85.0), 0), student(Some(86.0), 0)];
        assert_eq!(average_accuracy(&students), 83.7);
    }
}
