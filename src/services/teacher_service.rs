use sqlx::SqlitePool;
use tracing::info;

use crate::auth::hash_password;
use crate::database::models::{NewTeacher, Subject, Teacher, TeacherPatch, TeacherProfile};
use crate::database::{DatabaseError, Repository};
use crate::validation::{
    normalize_email, require_text, validate_email, validate_password, validate_phone,
};

#[derive(Clone)]
pub struct TeacherService {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl TeacherService {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    fn repo(&self) -> Repository<Teacher> {
        Repository::new(self.pool.clone())
    }

    async fn require_subject(&self, subject_id: i64) -> Result<Subject, DatabaseError> {
        Repository::<Subject>::new(self.pool.clone())
            .select_404(subject_id)
            .await
    }

    pub async fn create(&self, input: NewTeacher) -> Result<Teacher, DatabaseError> {
        require_text("name", &input.name)?;
        validate_email(&input.email)?;
        validate_phone(&input.phone)?;
        validate_password(&input.password)?;
        self.require_subject(input.subject_id).await?;

        let password_hash = hash_password(&input.password, self.bcrypt_cost).await?;

        let teacher = sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (name, email, phone, password_hash, subject_id) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(input.name.trim())
        .bind(normalize_email(&input.email))
        .bind(input.phone.trim())
        .bind(password_hash)
        .bind(input.subject_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "Teacher already exists"))?;

        info!("Created teacher {} for subject {}", teacher.teacher_id, teacher.subject_id);
        Ok(teacher)
    }

    pub async fn list_all(&self) -> Result<Vec<Teacher>, DatabaseError> {
        self.repo().select_all().await
    }

    pub async fn get_by_id(&self, teacher_id: i64) -> Result<Option<Teacher>, DatabaseError> {
        self.repo().select_id(teacher_id).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Teacher>, DatabaseError> {
        let teacher = sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(teacher)
    }

    /// Attach the owned subject for API output
    pub async fn profile(&self, teacher: Teacher) -> Result<TeacherProfile, DatabaseError> {
        let subject = Repository::<Subject>::new(self.pool.clone())
            .select_id(teacher.subject_id)
            .await?;
        Ok(TeacherProfile { teacher, subject })
    }

    pub async fn list_profiles(&self) -> Result<Vec<TeacherProfile>, DatabaseError> {
        let teachers = self.list_all().await?;
        let subjects = Repository::<Subject>::new(self.pool.clone()).select_all().await?;

        Ok(teachers
            .into_iter()
            .map(|teacher| {
                let subject = subjects
                    .iter()
                    .find(|s| s.subject_id == teacher.subject_id)
                    .cloned();
                TeacherProfile { teacher, subject }
            })
            .collect())
    }

    /// The subject this teacher grades
    pub async fn subject_of(&self, teacher_id: i64) -> Result<Subject, DatabaseError> {
        let teacher = self.repo().select_404(teacher_id).await?;
        self.require_subject(teacher.subject_id).await
    }

    pub async fn update(
        &self,
        teacher_id: i64,
        patch: TeacherPatch,
    ) -> Result<Option<Teacher>, DatabaseError> {
        let Some(mut teacher) = self.get_by_id(teacher_id).await? else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            require_text("name", &name)?;
            teacher.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            validate_email(&email)?;
            teacher.email = normalize_email(&email);
        }
        if let Some(phone) = patch.phone {
            validate_phone(&phone)?;
            teacher.phone = phone.trim().to_string();
        }
        if let Some(subject_id) = patch.subject_id {
            self.require_subject(subject_id).await?;
            teacher.subject_id = subject_id;
        }
        if let Some(password) = patch.password {
            validate_password(&password)?;
            teacher.password_hash = hash_password(&password, self.bcrypt_cost).await?;
        }

        let updated = sqlx::query_as::<_, Teacher>(
            "UPDATE teachers SET name = ?, email = ?, phone = ?, password_hash = ?, subject_id = ? \
             WHERE teacher_id = ? RETURNING *",
        )
        .bind(&teacher.name)
        .bind(&teacher.email)
        .bind(&teacher.phone)
        .bind(&teacher.password_hash)
        .bind(teacher.subject_id)
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "Teacher already exists"))?;

        Ok(updated)
    }

    pub async fn set_password(&self, teacher_id: i64, plain: &str) -> Result<bool, DatabaseError> {
        validate_password(plain)?;
        let password_hash = hash_password(plain, self.bcrypt_cost).await?;
        let result = sqlx::query("UPDATE teachers SET password_hash = ? WHERE teacher_id = ?")
            .bind(password_hash)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, teacher_id: i64) -> Result<bool, DatabaseError> {
        let deleted = self.repo().delete_id(teacher_id).await?;
        if deleted {
            info!("Deleted teacher {}", teacher_id);
        }
        Ok(deleted)
    }
}
