use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Subject {
    pub subject_id: i64,
    pub subject_name: String,
    /// Cohort year whose students may receive marks in this subject
    pub year: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSubject {
    pub subject_name: String,
    pub year: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubjectPatch {
    pub subject_name: Option<String>,
    pub year: Option<i64>,
}
