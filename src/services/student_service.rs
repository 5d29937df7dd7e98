use sqlx::SqlitePool;
use tracing::info;

use crate::database::models::{NewStudent, Student, StudentPatch};
use crate::database::{DatabaseError, Repository};
use crate::validation::{
    normalize_email, require_text, validate_dob, validate_email, validate_phone, validate_year,
};

#[derive(Clone)]
pub struct StudentService {
    pool: SqlitePool,
}

impl StudentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn repo(&self) -> Repository<Student> {
        Repository::new(self.pool.clone())
    }

    fn validate(student: &NewStudent) -> Result<(), DatabaseError> {
        require_text("name", &student.name)?;
        validate_email(&student.email)?;
        validate_phone(&student.phone)?;
        validate_dob(&student.dob)?;
        require_text("gender", &student.gender)?;
        require_text("address", &student.address)?;
        validate_year("admission_year", student.admission_year)?;
        validate_year("current_year", student.current_year)?;
        Ok(())
    }

    pub async fn create(&self, input: NewStudent) -> Result<Student, DatabaseError> {
        Self::validate(&input)?;

        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, email, phone, dob, gender, address, admission_year, current_year) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(input.name.trim())
        .bind(normalize_email(&input.email))
        .bind(input.phone.trim())
        .bind(&input.dob)
        .bind(input.gender.trim())
        .bind(input.address.trim())
        .bind(input.admission_year)
        .bind(input.current_year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "Student already exists"))?;

        info!("Created student {} in year {}", student.student_id, student.current_year);
        Ok(student)
    }

    pub async fn list_all(&self) -> Result<Vec<Student>, DatabaseError> {
        self.repo().select_all().await
    }

    pub async fn list_by_year(&self, current_year: i64) -> Result<Vec<Student>, DatabaseError> {
        self.repo().select_where("current_year", current_year).await
    }

    pub async fn get_by_id(&self, student_id: i64) -> Result<Option<Student>, DatabaseError> {
        self.repo().select_id(student_id).await
    }

    pub async fn update(
        &self,
        student_id: i64,
        patch: StudentPatch,
    ) -> Result<Option<Student>, DatabaseError> {
        let Some(current) = self.get_by_id(student_id).await? else {
            return Ok(None);
        };

        let merged = NewStudent {
            name: patch.name.unwrap_or(current.name),
            email: patch.email.unwrap_or(current.email),
            phone: patch.phone.unwrap_or(current.phone),
            dob: patch.dob.unwrap_or(current.dob),
            gender: patch.gender.unwrap_or(current.gender),
            address: patch.address.unwrap_or(current.address),
            admission_year: patch.admission_year.unwrap_or(current.admission_year),
            current_year: patch.current_year.unwrap_or(current.current_year),
        };
        Self::validate(&merged)?;

        let updated = sqlx::query_as::<_, Student>(
            "UPDATE students SET name = ?, email = ?, phone = ?, dob = ?, gender = ?, address = ?, \
             admission_year = ?, current_year = ? WHERE student_id = ? RETURNING *",
        )
        .bind(merged.name.trim())
        .bind(normalize_email(&merged.email))
        .bind(merged.phone.trim())
        .bind(&merged.dob)
        .bind(merged.gender.trim())
        .bind(merged.address.trim())
        .bind(merged.admission_year)
        .bind(merged.current_year)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "Student already exists"))?;

        if let Some(student) = &updated {
            info!("Updated student {} (current year {})", student.student_id, student.current_year);
        }
        Ok(updated)
    }

    /// Removes the student together with every mark recorded for them
    pub async fn delete(&self, student_id: i64) -> Result<bool, DatabaseError> {
        let deleted = self.repo().delete_id(student_id).await?;
        if deleted {
            info!("Deleted student {}", student_id);
        }
        Ok(deleted)
    }
}
