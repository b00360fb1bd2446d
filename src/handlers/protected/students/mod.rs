// handlers/protected/students/mod.rs - /students
//
// Reads are open to any signed-in user; the `schoolId` filter is whatever the
// caller asks for. Writes are super_admin only.

pub mod collection;
pub mod record;
pub mod stats;

pub use collection::{students_get, students_post};
pub use record::{student_delete, student_get, student_performance_get, student_put};
pub use stats::students_overview_get;

use serde::Deserialize;

use crate::filter::FilterData;
use crate::handlers::utils::present;

pub const STUDENTS_COLLECTION: &str = "students";

/// Query filters shared by student listings, stats and the leaderboard.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub school_id: Option<String>,
    pub class: Option<String>,
}

impl StudentQuery {
    pub fn filter(&self) -> FilterData {
        let mut filter = FilterData::new();
        if let Some(school_id) = present(self.school_id.clone()) {
            filter = filter.where_eq("schoolId", school_id);
        }
        if let Some(class) = present(self.class.clone()) {
            filter = filter.where_eq("class", class);
        }
        filter
    }
}
