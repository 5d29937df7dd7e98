use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::subject::Subject;
use crate::auth::Credentials;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Teacher {
    pub teacher_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subject_id: i64,
}

impl Credentials for Teacher {
    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

/// Teacher record as returned by the API, with the owned subject inlined
#[derive(Debug, Clone, Serialize)]
pub struct TeacherProfile {
    #[serde(flatten)]
    pub teacher: Teacher,
    pub subject: Option<Subject>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub subject_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeacherPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub subject_id: Option<i64>,
}
