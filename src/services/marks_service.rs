//! Mark entry for the four assessment categories.
//!
//! Every assignment and update first loads the student and the subject and
//! refuses to write unless the student's current year equals the subject's
//! year. Derived values (class-test average, SLA total) are computed here on
//! each write so stored rows are always consistent. Deletes are
//! unconditional.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::models::{
    ClassTestInput, ClassTestMark, ExperimentInput, ExperimentMark, ExperimentUpdate,
    PracticalInput, PracticalMark, SlaInput, SlaMark, Student, Subject, SubjectMarks,
};
use crate::database::repository::not_found;
use crate::database::{DatabaseError, Entity, Repository};
use crate::validation::validate_score;

#[derive(Debug, Error)]
pub enum MarksError {
    #[error("Student and Subject belong to different years (student year {student_year}, subject year {subject_year})")]
    YearMismatch { student_year: i64, subject_year: i64 },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub type MarksResult<T> = Result<T, MarksError>;

/// Mark rows that belong to one (student, subject) pair
pub trait MarkRow: Entity {
    fn student_id(&self) -> i64;
    fn subject_id(&self) -> i64;
}

macro_rules! impl_mark_row {
    ($($row:ty),*) => {
        $(impl MarkRow for $row {
            fn student_id(&self) -> i64 {
                self.student_id
            }
            fn subject_id(&self) -> i64 {
                self.subject_id
            }
        })*
    };
}

impl_mark_row!(ExperimentMark, PracticalMark, ClassTestMark, SlaMark);

#[derive(Clone)]
pub struct MarksService {
    pool: SqlitePool,
}

impl MarksService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Both records must exist and share a year before any write.
    pub async fn verify_year(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> MarksResult<(Student, Subject)> {
        let student = Repository::<Student>::new(self.pool.clone())
            .select_404(student_id)
            .await?;
        let subject = Repository::<Subject>::new(self.pool.clone())
            .select_404(subject_id)
            .await?;

        if student.current_year != subject.year {
            warn!(
                "Rejected marks for student {} in subject {}: year {} != {}",
                student_id, subject_id, student.current_year, subject.year
            );
            return Err(MarksError::YearMismatch {
                student_year: student.current_year,
                subject_year: subject.year,
            });
        }

        Ok((student, subject))
    }

    /// Load a mark row, treating rows of another subject as absent when a
    /// subject scope is given.
    pub async fn find_row<T: MarkRow>(&self, row_id: i64, scope: Option<i64>) -> MarksResult<T> {
        let row = Repository::<T>::new(self.pool.clone())
            .select_id(row_id)
            .await?
            .filter(|row| scope.map_or(true, |subject_id| row.subject_id() == subject_id))
            .ok_or_else(not_found::<T>)?;
        Ok(row)
    }

    async fn require_student(&self, student_id: i64) -> MarksResult<Student> {
        let student = Repository::<Student>::new(self.pool.clone())
            .select_404(student_id)
            .await?;
        Ok(student)
    }

    /// The row of a single-valued category for the pair, if recorded
    async fn single_of<T: MarkRow>(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> MarksResult<Option<T>> {
        let sql = format!("SELECT * FROM {} WHERE student_id = ? AND subject_id = ?", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(student_id)
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(row)
    }

    async fn delete_row<T: MarkRow>(&self, row_id: i64, scope: Option<i64>) -> MarksResult<()> {
        self.find_row::<T>(row_id, scope).await?;
        Repository::<T>::new(self.pool.clone()).delete_id(row_id).await?;
        info!("Deleted {} {}", T::LABEL.to_lowercase(), row_id);
        Ok(())
    }

    // -------------------- Experiment marks --------------------

    pub async fn assign_experiment(
        &self,
        student_id: i64,
        subject_id: i64,
        input: ExperimentInput,
    ) -> MarksResult<ExperimentMark> {
        if input.experiment_number < 1 {
            let message = "experiment_number must be at least 1".to_string();
            return Err(DatabaseError::Validation(message).into());
        }
        validate_score("marks_obtained", input.marks_obtained)?;
        self.verify_year(student_id, subject_id).await?;

        let mark = sqlx::query_as::<_, ExperimentMark>(
            "INSERT INTO experiment_marks (student_id, subject_id, experiment_number, marks_obtained) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(input.experiment_number)
        .bind(input.marks_obtained)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let message = format!(
                "Experiment {} is already recorded for this student",
                input.experiment_number
            );
            DatabaseError::from_write(e, &message)
        })?;

        info!(
            "Recorded experiment {} for student {} in subject {}",
            mark.experiment_number, student_id, subject_id
        );
        Ok(mark)
    }

    /// All experiment rows for the pair, ordered by experiment number
    pub async fn get_experiments(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> MarksResult<Vec<ExperimentMark>> {
        self.require_student(student_id).await?;
        self.experiments_of(student_id, subject_id).await
    }

    async fn experiments_of(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> MarksResult<Vec<ExperimentMark>> {
        let rows = sqlx::query_as::<_, ExperimentMark>(
            "SELECT * FROM experiment_marks WHERE student_id = ? AND subject_id = ? \
             ORDER BY experiment_number",
        )
        .bind(student_id)
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;
        Ok(rows)
    }

    pub async fn update_experiment(
        &self,
        row_id: i64,
        input: ExperimentUpdate,
        scope: Option<i64>,
    ) -> MarksResult<ExperimentMark> {
        validate_score("marks_obtained", input.marks_obtained)?;
        let mark = self.find_row::<ExperimentMark>(row_id, scope).await?;
        self.verify_year(mark.student_id, mark.subject_id).await?;

        let updated = sqlx::query_as::<_, ExperimentMark>(
            "UPDATE experiment_marks SET marks_obtained = ? WHERE experiment_marks_id = ? RETURNING *",
        )
        .bind(input.marks_obtained)
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(not_found::<ExperimentMark>)?;
        Ok(updated)
    }

    pub async fn delete_experiment(&self, row_id: i64, scope: Option<i64>) -> MarksResult<()> {
        self.delete_row::<ExperimentMark>(row_id, scope).await
    }

    // -------------------- Practical exam marks --------------------

    pub async fn assign_practical(
        &self,
        student_id: i64,
        subject_id: i64,
        input: PracticalInput,
    ) -> MarksResult<PracticalMark> {
        validate_score("practical_exam_marks", input.practical_exam_marks)?;
        self.verify_year(student_id, subject_id).await?;

        let mark = sqlx::query_as::<_, PracticalMark>(
            "INSERT INTO practical_marks (student_id, subject_id, practical_exam_marks) \
             VALUES (?, ?, ?) RETURNING *",
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(input.practical_exam_marks)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_write(e, "Practical marks are already recorded for this student")
        })?;

        info!("Recorded practical marks for student {} in subject {}", student_id, subject_id);
        Ok(mark)
    }

    pub async fn get_practical(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> MarksResult<PracticalMark> {
        self.require_student(student_id).await?;
        let row = self.single_of::<PracticalMark>(student_id, subject_id).await?;
        Ok(row.ok_or_else(not_found::<PracticalMark>)?)
    }

    pub async fn update_practical(
        &self,
        row_id: i64,
        input: PracticalInput,
        scope: Option<i64>,
    ) -> MarksResult<PracticalMark> {
        validate_score("practical_exam_marks", input.practical_exam_marks)?;
        let mark = self.find_row::<PracticalMark>(row_id, scope).await?;
        self.verify_year(mark.student_id, mark.subject_id).await?;

        let updated = sqlx::query_as::<_, PracticalMark>(
            "UPDATE practical_marks SET practical_exam_marks = ? WHERE practical_marks_id = ? RETURNING *",
        )
        .bind(input.practical_exam_marks)
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(not_found::<PracticalMark>)?;
        Ok(updated)
    }

    pub async fn delete_practical(&self, row_id: i64, scope: Option<i64>) -> MarksResult<()> {
        self.delete_row::<PracticalMark>(row_id, scope).await
    }

    // -------------------- Class test marks --------------------

    pub async fn assign_class_test(
        &self,
        student_id: i64,
        subject_id: i64,
        input: ClassTestInput,
    ) -> MarksResult<ClassTestMark> {
        validate_score("class_test_1", input.class_test_1)?;
        validate_score("class_test_2", input.class_test_2)?;
        self.verify_year(student_id, subject_id).await?;

        let mark = sqlx::query_as::<_, ClassTestMark>(
            "INSERT INTO class_test_marks (student_id, subject_id, class_test_1, class_test_2, average_marks) \
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(input.class_test_1)
        .bind(input.class_test_2)
        .bind(input.average())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_write(e, "Class test marks are already recorded for this student")
        })?;

        info!("Recorded class test marks for student {} in subject {}", student_id, subject_id);
        Ok(mark)
    }

    pub async fn get_class_test(
        &self,
        student_id: i64,
        subject_id: i64,
    ) -> MarksResult<ClassTestMark> {
        self.require_student(student_id).await?;
        let row = self.single_of::<ClassTestMark>(student_id, subject_id).await?;
        Ok(row.ok_or_else(not_found::<ClassTestMark>)?)
    }

    pub async fn update_class_test(
        &self,
        row_id: i64,
        input: ClassTestInput,
        scope: Option<i64>,
    ) -> MarksResult<ClassTestMark> {
        validate_score("class_test_1", input.class_test_1)?;
        validate_score("class_test_2", input.class_test_2)?;
        let mark = self.find_row::<ClassTestMark>(row_id, scope).await?;
        self.verify_year(mark.student_id, mark.subject_id).await?;

        let updated = sqlx::query_as::<_, ClassTestMark>(
            "UPDATE class_test_marks SET class_test_1 = ?, class_test_2 = ?, average_marks = ? \
             WHERE class_test_marks_id = ? RETURNING *",
        )
        .bind(input.class_test_1)
        .bind(input.class_test_2)
        .bind(input.average())
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(not_found::<ClassTestMark>)?;
        Ok(updated)
    }

    pub async fn delete_class_test(&self, row_id: i64, scope: Option<i64>) -> MarksResult<()> {
        self.delete_row::<ClassTestMark>(row_id, scope).await
    }

    // -------------------- SLA marks --------------------

    pub async fn assign_sla(
        &self,
        student_id: i64,
        subject_id: i64,
        input: SlaInput,
    ) -> MarksResult<SlaMark> {
        validate_score("micro_project", input.micro_project)?;
        validate_score("assignment", input.assignment)?;
        validate_score("other_marks", input.other_marks)?;
        self.verify_year(student_id, subject_id).await?;

        let mark = sqlx::query_as::<_, SlaMark>(
            "INSERT INTO sla_marks (student_id, subject_id, micro_project, assignment, other_marks, total_marks) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(student_id)
        .bind(subject_id)
        .bind(input.micro_project)
        .bind(input.assignment)
        .bind(input.other_marks)
        .bind(input.total())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_write(e, "SLA marks are already recorded for this student")
        })?;

        info!("Recorded SLA marks for student {} in subject {}", student_id, subject_id);
        Ok(mark)
    }

    pub async fn get_sla(&self, student_id: i64, subject_id: i64) -> MarksResult<SlaMark> {
        self.require_student(student_id).await?;
        let row = self.single_of::<SlaMark>(student_id, subject_id).await?;
        Ok(row.ok_or_else(not_found::<SlaMark>)?)
    }

    pub async fn update_sla(
        &self,
        row_id: i64,
        input: SlaInput,
        scope: Option<i64>,
    ) -> MarksResult<SlaMark> {
        validate_score("micro_project", input.micro_project)?;
        validate_score("assignment", input.assignment)?;
        validate_score("other_marks", input.other_marks)?;
        let mark = self.find_row::<SlaMark>(row_id, scope).await?;
        self.verify_year(mark.student_id, mark.subject_id).await?;

        let updated = sqlx::query_as::<_, SlaMark>(
            "UPDATE sla_marks SET micro_project = ?, assignment = ?, other_marks = ?, total_marks = ? \
             WHERE sla_marks_id = ? RETURNING *",
        )
        .bind(input.micro_project)
        .bind(input.assignment)
        .bind(input.other_marks)
        .bind(input.total())
        .bind(row_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?
        .ok_or_else(not_found::<SlaMark>)?;
        Ok(updated)
    }

    pub async fn delete_sla(&self, row_id: i64, scope: Option<i64>) -> MarksResult<()> {
        self.delete_row::<SlaMark>(row_id, scope).await
    }

    // -------------------- Aggregates --------------------

    /// Every category for one student in one subject. Reads need no year check.
    pub async fn subject_marks(
        &self,
        student_id: i64,
        subject: Subject,
    ) -> MarksResult<SubjectMarks> {
        let subject_id = subject.subject_id;
        let experiments = self.experiments_of(student_id, subject_id).await?;
        let practical = self.single_of(student_id, subject_id).await?;
        let class_test = self.single_of(student_id, subject_id).await?;
        let sla = self.single_of(student_id, subject_id).await?;
        Ok(SubjectMarks::new(subject, experiments, practical, class_test, sla))
    }

    /// Marks for every subject the student has at least one row in
    pub async fn student_marks(&self, student_id: i64) -> MarksResult<Vec<SubjectMarks>> {
        self.require_student(student_id).await?;

        let subjects = sqlx::query_as::<_, Subject>(
            "SELECT s.* FROM subjects s WHERE s.subject_id IN ( \
                SELECT subject_id FROM experiment_marks WHERE student_id = ?1 \
                UNION SELECT subject_id FROM practical_marks WHERE student_id = ?1 \
                UNION SELECT subject_id FROM class_test_marks WHERE student_id = ?1 \
                UNION SELECT subject_id FROM sla_marks WHERE student_id = ?1 \
             ) ORDER BY s.year, s.subject_name",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let mut all = Vec::with_capacity(subjects.len());
        for subject in subjects {
            all.push(self.subject_marks(student_id, subject).await?);
        }
        Ok(all)
    }
}

/// Turn a "not found" for a singleton category into `None`
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::database::models::{NewStudent, NewSubject, StudentPatch};
    use crate::database::DatabaseManager;
    use crate::services::{StudentService, SubjectService};

    async fn setup() -> (MarksService, StudentService, Student, Subject) {
        let pool = DatabaseManager::connect(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
        })
        .await
        .unwrap();
        DatabaseManager::ensure_schema(&pool).await.unwrap();

        let subject = SubjectService::new(pool.clone())
            .create(NewSubject {
                subject_name: "Data Structures".to_string(),
                year: 2,
            })
            .await
            .unwrap();
        let students = StudentService::new(pool.clone());
        let student = students
            .create(NewStudent {
                name: "Asha Rao".to_string(),
                email: "asha@college.edu".to_string(),
                phone: "9000000001".to_string(),
                dob: "2004-05-17".to_string(),
                gender: "F".to_string(),
                address: "12 Hill Road".to_string(),
                admission_year: 2023,
                current_year: 2,
            })
            .await
            .unwrap();

        (MarksService::new(pool), students, student, subject)
    }

    #[tokio::test]
    async fn experiment_marks_follow_student_year() {
        let (marks, students, student, subject) = setup().await;

        let first = marks
            .assign_experiment(
                student.student_id,
                subject.subject_id,
                ExperimentInput {
                    experiment_number: 1,
                    marks_obtained: 8.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(first.marks_obtained, 8.0);

        let rows = marks.get_experiments(student.student_id, subject.subject_id).await.unwrap();
        assert_eq!(rows, vec![first]);

        students
            .update(
                student.student_id,
                StudentPatch {
                    current_year: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = marks
            .assign_experiment(
                student.student_id,
                subject.subject_id,
                ExperimentInput {
                    experiment_number: 2,
                    marks_obtained: 7.0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MarksError::YearMismatch {
                student_year: 3,
                subject_year: 2
            }
        ));

        let rows = marks.get_experiments(student.student_id, subject.subject_id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn class_test_average_recomputed_on_update() {
        let (marks, _, student, subject) = setup().await;

        let created = marks
            .assign_class_test(
                student.student_id,
                subject.subject_id,
                ClassTestInput {
                    class_test_1: 70.0,
                    class_test_2: 80.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.average_marks, 75.0);

        let updated = marks
            .update_class_test(
                created.class_test_marks_id,
                ClassTestInput {
                    class_test_1: 90.0,
                    class_test_2: 61.0,
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.average_marks, 75.5);

        let read = marks.get_class_test(student.student_id, subject.subject_id).await.unwrap();
        assert_eq!(read, updated);
    }

    #[tokio::test]
    async fn sla_total_and_duplicate_rejection() {
        let (marks, _, student, subject) = setup().await;
        let input = SlaInput {
            micro_project: 30.0,
            assignment: 20.0,
            other_marks: 15.0,
        };

        let sla = marks
            .assign_sla(student.student_id, subject.subject_id, input.clone())
            .await
            .unwrap();
        assert_eq!(sla.total_marks, 65.0);

        let err = marks
            .assign_sla(student.student_id, subject.subject_id, input)
            .await
            .unwrap_err();
        assert!(matches!(err, MarksError::Database(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn singleton_reads_report_missing_rows() {
        let (marks, _, student, subject) = setup().await;

        let err = marks.get_practical(student.student_id, subject.subject_id).await.unwrap_err();
        assert!(matches!(err, MarksError::Database(DatabaseError::NotFound(_))));
        assert!(marks.get_sla(student.student_id, subject.subject_id).await.is_err());
    }

    #[tokio::test]
    async fn missing_student_is_not_found() {
        let (marks, _, _, subject) = setup().await;

        let err = marks
            .assign_practical(
                999,
                subject.subject_id,
                PracticalInput {
                    practical_exam_marks: 50.0,
                },
            )
            .await
            .unwrap_err();
        match err {
            MarksError::Database(DatabaseError::NotFound(msg)) => {
                assert_eq!(msg, "Student not found")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Reads name the missing student rather than the missing row
        let subject_id = subject.subject_id;
        let reads = [
            marks.get_experiments(999, subject_id).await.map(|_| ()),
            marks.get_practical(999, subject_id).await.map(|_| ()),
            marks.get_class_test(999, subject_id).await.map(|_| ()),
            marks.get_sla(999, subject_id).await.map(|_| ()),
        ];
        for read in reads {
            match read {
                Err(MarksError::Database(DatabaseError::NotFound(msg))) => {
                    assert_eq!(msg, "Student not found")
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn delete_skips_year_check_and_respects_scope() {
        let (marks, students, student, subject) = setup().await;
        let practical = marks
            .assign_practical(
                student.student_id,
                subject.subject_id,
                PracticalInput {
                    practical_exam_marks: 44.0,
                },
            )
            .await
            .unwrap();

        students
            .update(
                student.student_id,
                StudentPatch {
                    current_year: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Update is refused after the student moved on
        let err = marks
            .update_practical(
                practical.practical_marks_id,
                PracticalInput {
                    practical_exam_marks: 50.0,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarksError::YearMismatch { .. }));

        // A different subject scope cannot see the row
        let err = marks
            .delete_practical(practical.practical_marks_id, Some(subject.subject_id + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, MarksError::Database(DatabaseError::NotFound(_))));

        marks
            .delete_practical(practical.practical_marks_id, Some(subject.subject_id))
            .await
            .unwrap();
        assert!(marks.get_practical(student.student_id, subject.subject_id).await.is_err());
    }

    #[tokio::test]
    async fn student_marks_consolidates_categories() {
        let (marks, _, student, subject) = setup().await;
        for (number, score) in [(1, 10.0), (2, 15.0)] {
            marks
                .assign_experiment(
                    student.student_id,
                    subject.subject_id,
                    ExperimentInput {
                        experiment_number: number,
                        marks_obtained: score,
                    },
                )
                .await
                .unwrap();
        }
        marks
            .assign_practical(
                student.student_id,
                subject.subject_id,
                PracticalInput {
                    practical_exam_marks: 60.0,
                },
            )
            .await
            .unwrap();

        let all = marks.student_marks(student.student_id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].totals.experiment_total, 25.0);
        assert_eq!(all[0].totals.total, 85.0);
        assert!(all[0].class_test.is_none());
    }
}
