use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify constraint failures so callers can report them as conflicts
    /// instead of generic storage errors.
    pub fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let message = db_err.message();
                if message.contains(".email") {
                    return DatabaseError::Conflict("Email is already in use".to_string());
                }
                if message.contains(".phone") {
                    return DatabaseError::Conflict("Phone is already in use".to_string());
                }
                return DatabaseError::Conflict(conflict_message.to_string());
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::Conflict(conflict_message.to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS hods (
        hod_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS subjects (
        subject_id INTEGER PRIMARY KEY AUTOINCREMENT,
        subject_name TEXT NOT NULL,
        year INTEGER NOT NULL CHECK (year >= 1)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS teachers (
        teacher_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        subject_id INTEGER NOT NULL REFERENCES subjects(subject_id) ON DELETE RESTRICT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS students (
        student_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL UNIQUE,
        dob TEXT NOT NULL,
        gender TEXT NOT NULL,
        address TEXT NOT NULL,
        admission_year INTEGER NOT NULL,
        current_year INTEGER NOT NULL CHECK (current_year >= 1)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS experiment_marks (
        experiment_marks_id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
        subject_id INTEGER NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
        experiment_number INTEGER NOT NULL CHECK (experiment_number >= 1),
        marks_obtained REAL NOT NULL,
        UNIQUE (student_id, subject_id, experiment_number)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS practical_marks (
        practical_marks_id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
        subject_id INTEGER NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
        practical_exam_marks REAL NOT NULL,
        UNIQUE (student_id, subject_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS class_test_marks (
        class_test_marks_id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
        subject_id INTEGER NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
        class_test_1 REAL NOT NULL,
        class_test_2 REAL NOT NULL,
        average_marks REAL NOT NULL,
        UNIQUE (student_id, subject_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sla_marks (
        sla_marks_id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
        subject_id INTEGER NOT NULL REFERENCES subjects(subject_id) ON DELETE CASCADE,
        micro_project REAL NOT NULL,
        assignment REAL NOT NULL,
        other_marks REAL NOT NULL,
        total_marks REAL NOT NULL,
        UNIQUE (student_id, subject_id)
    )
    "#,
];

/// Connection pool construction and schema setup for the marks register
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for the configured database URL.
    ///
    /// In-memory databases live inside a single connection, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl(config.url.clone()))?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool_options = if Self::is_memory_url(&config.url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await?;

        info!("Opened database pool for: {}", config.url);
        Ok(pool)
    }

    /// Create every table that does not exist yet
    pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Database schema ready ({} tables)", SCHEMA.len());
        Ok(())
    }

    pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn is_memory_url(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}
