use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: String,
    pub address: String,
    pub admission_year: i64,
    pub current_year: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: String,
    pub address: String,
    pub admission_year: i64,
    pub current_year: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub admission_year: Option<i64>,
    pub current_year: Option<i64>,
}
