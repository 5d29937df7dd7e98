use sqlx::SqlitePool;
use tracing::info;

use crate::auth::hash_password;
use crate::config::BootstrapConfig;
use crate::database::models::{Hod, HodPatch, NewHod};
use crate::database::{DatabaseError, Repository};
use crate::validation::{
    normalize_email, require_text, validate_email, validate_password, validate_phone,
};

#[derive(Clone)]
pub struct HodService {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl HodService {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    fn repo(&self) -> Repository<Hod> {
        Repository::new(self.pool.clone())
    }

    pub async fn create(&self, input: NewHod) -> Result<Hod, DatabaseError> {
        require_text("name", &input.name)?;
        validate_email(&input.email)?;
        validate_phone(&input.phone)?;
        validate_password(&input.password)?;

        let password_hash = hash_password(&input.password, self.bcrypt_cost).await?;

        let hod = sqlx::query_as::<_, Hod>(
            "INSERT INTO hods (name, email, phone, password_hash) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(input.name.trim())
        .bind(normalize_email(&input.email))
        .bind(input.phone.trim())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "HOD already exists"))?;

        info!("Created HOD {} ({})", hod.hod_id, hod.email);
        Ok(hod)
    }

    pub async fn list_all(&self) -> Result<Vec<Hod>, DatabaseError> {
        self.repo().select_all().await
    }

    pub async fn get_by_id(&self, hod_id: i64) -> Result<Option<Hod>, DatabaseError> {
        self.repo().select_id(hod_id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Hod>, DatabaseError> {
        let hod = sqlx::query_as::<_, Hod>("SELECT * FROM hods WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(hod)
    }

    /// Apply the supplied fields; `None` when the HOD does not exist.
    pub async fn update(&self, hod_id: i64, patch: HodPatch) -> Result<Option<Hod>, DatabaseError> {
        let Some(mut hod) = self.get_by_id(hod_id).await? else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            require_text("name", &name)?;
            hod.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            validate_email(&email)?;
            hod.email = normalize_email(&email);
        }
        if let Some(phone) = patch.phone {
            validate_phone(&phone)?;
            hod.phone = phone.trim().to_string();
        }
        if let Some(password) = patch.password {
            validate_password(&password)?;
            hod.password_hash = hash_password(&password, self.bcrypt_cost).await?;
        }

        let updated = sqlx::query_as::<_, Hod>(
            "UPDATE hods SET name = ?, email = ?, phone = ?, password_hash = ? WHERE hod_id = ? RETURNING *",
        )
        .bind(&hod.name)
        .bind(&hod.email)
        .bind(&hod.phone)
        .bind(&hod.password_hash)
        .bind(hod_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "HOD already exists"))?;

        Ok(updated)
    }

    pub async fn set_password(&self, hod_id: i64, plain: &str) -> Result<bool, DatabaseError> {
        validate_password(plain)?;
        let password_hash = hash_password(plain, self.bcrypt_cost).await?;
        let result = sqlx::query("UPDATE hods SET password_hash = ? WHERE hod_id = ?")
            .bind(password_hash)
            .bind(hod_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, hod_id: i64) -> Result<bool, DatabaseError> {
        let deleted = self.repo().delete_id(hod_id).await?;
        if deleted {
            info!("Deleted HOD {}", hod_id);
        }
        Ok(deleted)
    }

    /// Create the configured default HOD when no HOD exists yet.
    pub async fn ensure_default(
        &self,
        bootstrap: &BootstrapConfig,
    ) -> Result<Option<Hod>, DatabaseError> {
        let (Some(email), Some(password)) = (&bootstrap.hod_email, &bootstrap.hod_password) else {
            return Ok(None);
        };
        if self.repo().count().await? > 0 {
            return Ok(None);
        }

        let hod = self
            .create(NewHod {
                name: bootstrap.hod_name.clone(),
                email: email.clone(),
                phone: bootstrap.hod_phone.clone(),
                password: password.clone(),
            })
            .await?;
        info!("Bootstrapped default HOD account {}", hod.email);
        Ok(Some(hod))
    }
}
