// handlers/protected/analytics.rs - /analytics/*

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::api::format::number_at;
use crate::database::{Document, ID_FIELD};
use crate::filter::FilterData;
use crate::handlers::protected::leaderboard::capped_limit;
use crate::handlers::protected::schools::stats::school_stats;
use crate::handlers::protected::schools::SCHOOLS_COLLECTION;
use crate::handlers::protected::students::stats::average_accuracy;
use crate::handlers::protected::students::{StudentQuery, STUDENTS_COLLECTION};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, QueryParams, SuperAdmin};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_schools: u64,
    pub total_students: u64,
    pub active_schools: u64,
    pub average_accuracy: f64,
}

/// GET /analytics/dashboard - platform-wide totals.
pub async fn dashboard_get(State(state): State<AppState>, _auth: AuthUser) -> ApiResult<DashboardStats> {
    let store = state.store().await?;
    let schools = school_stats(store.as_ref()).await?;
    let students = store.find(STUDENTS_COLLECTION, &FilterData::new()).await?;

    Ok(ApiResponse::success(DashboardStats {
        total_schools: schools.total_schools,
        total_students: students.len() as u64,
        active_schools: schools.active_schools,
        average_accuracy: average_accuracy(&students),
    }))
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub excellent: u64,
    pub good: u64,
    pub average: u64,
    pub needs_improvement: u64,
}

/// GET /analytics/performance/distribution - students bucketed by accuracy.
pub async fn distribution_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(query): QueryParams<StudentQuery>,
) -> ApiResult<Value> {
    let store = state.store().await?;
    let students = store.find(STUDENTS_COLLECTION, &query.filter()).await?;
    Ok(ApiResponse::success(serde_json::json!({
        "distribution": distribution(&students),
    })))
}

/// 90+ excellent, 80-89 good, 70-79 average, below that needs improvement.
/// Students with no accuracy figure are not counted.
pub fn distribution(students: &[Document]) -> Distribution {
    let mut buckets = Distribution::default();
    for accuracy in students
        .iter()
        .filter_map(|s| number_at(s, "performance.accuracyPercentage"))
    {
        match accuracy {
            a if a >= 90.0 => buckets.excellent += 1,
            a if a >= 80.0 => buckets.good += 1,
            a if a >= 70.0 => buckets.average += 1,
            _ => buckets.needs_improvement += 1,
        }
    }
    buckets
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAverage {
    pub skill: String,
    pub average: f64,
    pub students: u64,
}

/// GET /analytics/performance/skills - mean score per skill area.
pub async fn skills_get(
    State(state): State<AppState>,
    _auth: AuthUser,
    QueryParams(query): QueryParams<StudentQuery>,
) -> ApiResult<Vec<SkillAverage>> {
    let store = state.store().await?;
    let students = store.find(STUDENTS_COLLECTION, &query.filter()).await?;
    Ok(ApiResponse::success(skill_averages(&students)))
}

/// Averages every numeric entry under `performance.skillAreas`, one row per
/// skill name in name order. Rounded to one decimal.
pub fn skill_averages(students: &[Document]) -> Vec<SkillAverage> {
    let mut totals: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for areas in students.iter().filter_map(|s| {
        s.get("performance")
            .and_then(|p| p.get("skillAreas"))
            .and_then(Value::as_object)
    }) {
        for (skill, score) in areas {
            if let Some(score) = score.as_f64() {
                let entry = totals.entry(skill.clone()).or_insert((0.0, 0));
                entry.0 += score;
                entry.1 += 1;
            }
        }
    }

    totals
        .into_iter()
        .map(|(skill, (sum, count))| SkillAverage {
            skill,
            average: (sum / count as f64 * 10.0).round() / 10.0,
            students: count,
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct TopSchoolsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolPerformance {
    pub id: String,
    pub name: Value,
    pub board: Value,
    pub students: u64,
    pub average_accuracy: f64,
    pub total_lessons: u64,
    pub rank: usize,
}

/// GET /analytics/schools/top-performing - schools ranked by student accuracy.
pub async fn top_schools_get(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    QueryParams(query): QueryParams<TopSchoolsQuery>,
) -> ApiResult<Vec<SchoolPerformance>> {
    let limit = capped_limit(query.limit, state.config.api.max_page_size)?;

    let store = state.store().await?;
    let schools = store.find(SCHOOLS_COLLECTION, &FilterData::new()).await?;
    let students = store.find(STUDENTS_COLLECTION, &FilterData::new()).await?;

    let mut ranked = rank_schools(schools, students);
    ranked.truncate(limit);
    Ok(ApiResponse::success(ranked))
}

/// Highest average accuracy first, then most students. Schools without
/// students sort after every school that has some.
pub fn rank_schools(schools: Vec<Document>, students: Vec<Document>) -> Vec<SchoolPerformance> {
    let mut by_school: HashMap<String, Vec<Document>> = HashMap::new();
    for student in students {
        if let Some(school_id) = student.get("schoolId").and_then(Value::as_str) {
            by_school.entry(school_id.to_string()).or_default().push(student);
        }
    }

    let mut ranked: Vec<SchoolPerformance> = schools
        .into_iter()
        .filter_map(|school| {
            let id = school.get(ID_FIELD).and_then(Value::as_str)?.to_string();
            let enrolled = by_school.remove(&id).unwrap_or_default();
            let total_lessons = enrolled
                .iter()
                .filter_map(|s| number_at(s, "performance.lessonsCompleted"))
                .sum::<f64>() as u64;

            Some(SchoolPerformance {
                name: school.get("name").cloned().unwrap_or(Value::Null),
                board: school.get("board").cloned().unwrap_or(Value::Null),
                students: enrolled.len() as u64,
                average_accuracy: average_accuracy(&enrolled),
                total_lessons,
                rank: 0,
                id,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        (b.students > 0)
            .cmp(&(a.students > 0))
            .then(b.average_accuracy.partial_cmp(&a.average_accuracy).unwrap_or(Ordering::Equal))
            .then(b.students.cmp(&a.students))
    });
    for (i, school) in ranked.iter_mut().enumerate() {
        school.rank = i + 1;
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::format::into_document;
    use crate::auth::Role;
    use crate::testing::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn buckets_by_accuracy() {
        let students: Vec<Document> = [95.0, 90.0, 89.9, 80.0, 75.0, 12.0]
            .iter()
            .map(|a| into_document(json!({"performance": {"accuracyPercentage": a}})))
            .chain(std::iter::once(into_document(json!({"name": "no data"}))))
            .collect();

        assert_eq!(
            distribution(&students),
            Distribution {
                excellent: 2,
                good: 2,
                average: 1,
                needs_improvement: 1
            }
        );
    }

    #[test]
    fn averages_each_skill_area() {
        let students = vec![
            into_document(json!({"performance": {"skillAreas": {"grammar": 80, "vocabulary": 90}}})),
            into_document(json!({"performance": {"skillAreas": {"grammar": 71, "speaking": "n/a"}}})),
            into_document(json!({"performance": {"xpPoints": 10}})),
        ];

        assert_eq!(
            skill_averages(&students),
            vec![
                SkillAverage { skill: "grammar".into(), average: 75.5, students: 2 },
                SkillAverage { skill: "vocabulary".into(), average: 90.0, students: 1 },
            ]
        );
        assert!(skill_averages(&[]).is_empty());
    }

    #[test]
    fn schools_rank_by_accuracy_with_empty_schools_last() {
        let schools = vec![
            into_document(json!({"_id": "empty", "name": "Empty", "board": "CBSE"})),
            into_document(json!({"_id": "low", "name": "Low", "board": "ICSE"})),
            into_document(json!({"_id": "high", "name": "High", "board": "IB"})),
        ];
        let students = vec![
            into_document(json!({"schoolId": "low", "performance": {"accuracyPercentage": 60, "lessonsCompleted": 3}})),
            into_document(json!({"schoolId": "high", "performance": {"accuracyPercentage": 90, "lessonsCompleted": 5}})),
            into_document(json!({"schoolId": "high", "performance": {"accuracyPercentage": 80, "lessonsCompleted": 7}})),
            into_document(json!({"schoolId": "gone", "performance": {"accuracyPercentage": 99}})),
        ];

        let ranked = rank_schools(schools, students);
        let ids: Vec<&str> = ranked.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "low", "empty"]);

        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].students, 2);
        assert_eq!(ranked[0].average_accuracy, 85.0);
        assert_eq!(ranked[0].total_lessons, 12);
        assert_eq!(ranked[2].students, 0);
        assert_eq!(ranked[2].rank, 3);
    }

    #[tokio::test]
    async fn skills_and_top_schools_over_http() {
        let app = TestApp::new();
        let school = app.insert("schools", json!({"name": "Hill", "board": "CBSE"})).await;
        app.insert(
            "students",
            json!({"schoolId": school, "performance": {"accuracyPercentage": 88, "skillAreas": {"listening": 70}}}),
        )
        .await;
        app.insert("students", json!({"schoolId": "elsewhere", "performance": {"skillAreas": {"listening": 90}}}))
            .await;

        let (school_admin, _) = app.user(Role::SchoolAdmin).await;
        let skills = app
            .get(&format!("/api/analytics/performance/skills?schoolId={}", school), Some(&school_admin))
            .await;
        assert_eq!(skills.status, StatusCode::OK);
        assert_eq!(skills.body, json!([{"skill": "listening", "average": 70.0, "students": 1}]));

        let forbidden = app.get("/api/analytics/schools/top-performing", Some(&school_admin)).await;
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

        let admin = app.super_admin().await;
        let top = app.get("/api/analytics/schools/top-performing?limit=5", Some(&admin)).await;
        assert_eq!(top.status, StatusCode::OK);
        assert_eq!(top.body[0]["id"], school.as_str());
        assert_eq!(top.body[0]["averageAccuracy"], 88.0);
        assert_eq!(top.body[0]["rank"], 1);

        let zero = app.get("/api/analytics/schools/top-performing?limit=0", Some(&admin)).await;
        assert_eq!(zero.status, StatusCode::BAD_REQUEST);
    }
}
