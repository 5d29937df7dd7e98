use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::Credentials;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Hod {
    pub hod_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Credentials for Hod {
    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewHod {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HodPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}
