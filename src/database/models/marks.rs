use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::subject::Subject;

/// Points available per mark category; a subject is scored out of four of these.
pub const CATEGORY_MAX: f64 = 100.0;
pub const SUBJECT_MAX: f64 = 4.0 * CATEGORY_MAX;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ExperimentMark {
    pub experiment_marks_id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub experiment_number: i64,
    pub marks_obtained: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct PracticalMark {
    pub practical_marks_id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub practical_exam_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ClassTestMark {
    pub class_test_marks_id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub class_test_1: f64,
    pub class_test_2: f64,
    pub average_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SlaMark {
    pub sla_marks_id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub micro_project: f64,
    pub assignment: f64,
    pub other_marks: f64,
    pub total_marks: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentInput {
    pub experiment_number: i64,
    pub marks_obtained: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentUpdate {
    pub marks_obtained: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PracticalInput {
    pub practical_exam_marks: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassTestInput {
    pub class_test_1: f64,
    pub class_test_2: f64,
}

impl ClassTestInput {
    pub fn average(&self) -> f64 {
        (self.class_test_1 + self.class_test_2) / 2.0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlaInput {
    pub micro_project: f64,
    pub assignment: f64,
    pub other_marks: f64,
}

impl SlaInput {
    pub fn total(&self) -> f64 {
        self.micro_project + self.assignment + self.other_marks
    }
}

/// Consolidated per-subject score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkTotals {
    pub experiment_total: f64,
    pub practical: f64,
    pub class_test_average: f64,
    pub sla_total: f64,
    pub total: f64,
    pub percentage: f64,
}

/// Every mark recorded for one student in one subject
#[derive(Debug, Clone, Serialize)]
pub struct SubjectMarks {
    pub subject: Subject,
    pub experiments: Vec<ExperimentMark>,
    pub practical: Option<PracticalMark>,
    pub class_test: Option<ClassTestMark>,
    pub sla: Option<SlaMark>,
    pub totals: MarkTotals,
}

impl SubjectMarks {
    pub fn new(
        subject: Subject,
        experiments: Vec<ExperimentMark>,
        practical: Option<PracticalMark>,
        class_test: Option<ClassTestMark>,
        sla: Option<SlaMark>,
    ) -> Self {
        let experiment_total = experiments.iter().map(|e| e.marks_obtained).sum();
        let practical_marks = practical.as_ref().map_or(0.0, |p| p.practical_exam_marks);
        let class_test_average = class_test.as_ref().map_or(0.0, |c| c.average_marks);
        let sla_total = sla.as_ref().map_or(0.0, |s| s.total_marks);
        let total = experiment_total + practical_marks + class_test_average + sla_total;

        Self {
            subject,
            experiments,
            practical,
            class_test,
            sla,
            totals: MarkTotals {
                experiment_total,
                practical: practical_marks,
                class_test_average,
                sla_total,
                total,
                percentage: total / SUBJECT_MAX * 100.0,
            },
        }
    }
}
