use serde::{Deserialize, Serialize};

use crate::database::DatabaseError;

/// The two principals that can hold a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hod,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hod => "hod",
            Role::Teacher => "teacher",
        }
    }

    /// Page a browser is sent to when a read request lacks this role's session
    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Hod => "/login/hod",
            Role::Teacher => "/login/teacher",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records that carry a bcrypt password hash
pub trait Credentials {
    fn password_hash(&self) -> &str;

    /// A malformed stored hash never matches.
    fn check_password(&self, plain: &str) -> bool {
        bcrypt::verify(plain, self.password_hash()).unwrap_or(false)
    }
}

/// Hash a plain-text password on the blocking pool.
pub async fn hash_password(plain: &str, cost: u32) -> Result<String, DatabaseError> {
    let plain = plain.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| DatabaseError::PasswordHash(e.to_string()))?
        .map_err(|e| DatabaseError::PasswordHash(e.to_string()))
}

/// Run [`Credentials::check_password`] on the blocking pool.
pub async fn verify_password<C>(record: &C, plain: &str) -> bool
where
    C: Credentials + Clone + Send + 'static,
{
    let record = record.clone();
    let plain = plain.to_string();
    tokio::task::spawn_blocking(move || record.check_password(&plain))
        .await
        .unwrap_or(false)
}
