use sqlx::SqlitePool;
use tracing::info;

use crate::database::models::{NewSubject, Subject, SubjectPatch};
use crate::database::{DatabaseError, Repository};
use crate::validation::{require_text, validate_year};

#[derive(Clone)]
pub struct SubjectService {
    pool: SqlitePool,
}

impl SubjectService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> Repository<Subject> {
        Repository::new(self.pool.clone())
    }

    pub async fn create(&self, input: NewSubject) -> Result<Subject, DatabaseError> {
        require_text("subject_name", &input.subject_name)?;
        validate_year("year", input.year)?;

        let subject = sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects (subject_name, year) VALUES (?, ?) RETURNING *",
        )
        .bind(input.subject_name.trim())
        .bind(input.year)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Created subject {} '{}' (year {})",
            subject.subject_id, subject.subject_name, subject.year
        );
        Ok(subject)
    }

    pub async fn list_all(&self) -> Result<Vec<Subject>, DatabaseError> {
        self.repo().select_all().await
    }

    pub async fn get_by_id(&self, subject_id: i64) -> Result<Option<Subject>, DatabaseError> {
        self.repo().select_id(subject_id).await
    }

    pub async fn update(
        &self,
        subject_id: i64,
        patch: SubjectPatch,
    ) -> Result<Option<Subject>, DatabaseError> {
        let Some(mut subject) = self.get_by_id(subject_id).await? else {
            return Ok(None);
        };

        if let Some(name) = patch.subject_name {
            require_text("subject_name", &name)?;
            subject.subject_name = name.trim().to_string();
        }
        if let Some(year) = patch.year {
            validate_year("year", year)?;
            subject.year = year;
        }

        let updated = sqlx::query_as::<_, Subject>(
            "UPDATE subjects SET subject_name = ?, year = ? WHERE subject_id = ? RETURNING *",
        )
        .bind(&subject.subject_name)
        .bind(subject.year)
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Mark rows for the subject go with it; a subject still owned by a
    /// teacher cannot be deleted.
    pub async fn delete(&self, subject_id: i64) -> Result<bool, DatabaseError> {
        let deleted = self.repo().delete_id(subject_id).await.map_err(|e| match e {
            DatabaseError::Conflict(_) => {
                DatabaseError::Conflict("Subject is assigned to a teacher".to_string())
            }
            other => other,
        })?;
        if deleted {
            info!("Deleted subject {}", subject_id);
        }
        Ok(deleted)
    }
}
