use serde::Serialize;
use sqlx::{self, sqlite::SqliteRow, FromRow, SqlitePool};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ClassTestMark, ExperimentMark, Hod, PracticalMark, SlaMark, Student, Subject, Teacher,
};

/// A table whose rows are addressed by a single integer key
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Unpin + Serialize {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Human-readable name used in "not found" messages
    const LABEL: &'static str;
}

impl Entity for Hod {
    const TABLE: &'static str = "hods";
    const ID_COLUMN: &'static str = "hod_id";
    const LABEL: &'static str = "HOD";
}

impl Entity for Teacher {
    const TABLE: &'static str = "teachers";
    const ID_COLUMN: &'static str = "teacher_id";
    const LABEL: &'static str = "Teacher";
}

impl Entity for Subject {
    const TABLE: &'static str = "subjects";
    const ID_COLUMN: &'static str = "subject_id";
    const LABEL: &'static str = "Subject";
}

impl Entity for Student {
    const TABLE: &'static str = "students";
    const ID_COLUMN: &'static str = "student_id";
    const LABEL: &'static str = "Student";
}

impl Entity for ExperimentMark {
    const TABLE: &'static str = "experiment_marks";
    const ID_COLUMN: &'static str = "experiment_marks_id";
    const LABEL: &'static str = "Experiment mark";
}

impl Entity for PracticalMark {
    const TABLE: &'static str = "practical_marks";
    const ID_COLUMN: &'static str = "practical_marks_id";
    const LABEL: &'static str = "Practical mark";
}

impl Entity for ClassTestMark {
    const TABLE: &'static str = "class_test_marks";
    const ID_COLUMN: &'static str = "class_test_marks_id";
    const LABEL: &'static str = "Class test marks";
}

impl Entity for SlaMark {
    const TABLE: &'static str = "sla_marks";
    const ID_COLUMN: &'static str = "sla_marks_id";
    const LABEL: &'static str = "SLA marks";
}

pub fn not_found<T: Entity>() -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", T::LABEL))
}

/// Id-keyed reads and deletes shared by every table
pub struct Repository<T> {
    pool: SqlitePool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_all(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", T::TABLE, T::ID_COLUMN);
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn select_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE {} = ?", T::TABLE, T::ID_COLUMN);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: i64) -> Result<T, DatabaseError> {
        self.select_id(id).await?.ok_or_else(not_found::<T>)
    }

    /// Rows matching a single column equality, in key order
    pub async fn select_where(
        &self,
        column: &'static str,
        value: i64,
    ) -> Result<Vec<T>, DatabaseError> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ? ORDER BY {}",
            T::TABLE,
            column,
            T::ID_COLUMN
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Returns false when no row had the id
    pub async fn delete_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", T::TABLE, T::ID_COLUMN);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::from_write(e, &format!("{} is still referenced", T::LABEL))
            })?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
