//! Downloadable mark reports.
//!
//! Data is loaded into a format-neutral [`ReportDocument`] (a title plus
//! tables of cells) and then rendered as a spreadsheet or a PDF. Rendered
//! bytes are also kept in the reports directory, written through a temporary
//! file that is renamed into place.

pub mod excel;
pub mod pdf;
pub mod stats;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_xlsxwriter::XlsxError;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::database::models::{Student, Subject, SubjectMarks};
use crate::database::{DatabaseError, Repository};
use crate::services::{MarksError, MarksService, StudentService};
use stats::{grade, grade_distribution, Summary};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid report format '{0}', expected 'excel' or 'pdf'")]
    InvalidFormat(String),

    #[error(transparent)]
    Data(#[from] DatabaseError),

    #[error("Spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] XlsxError),

    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Report file could not be written: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MarksError> for ReportError {
    fn from(err: MarksError) -> Self {
        match err {
            MarksError::Database(e) => ReportError::Data(e),
            other => ReportError::Data(DatabaseError::Validation(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Excel,
    Pdf,
}

impl ReportFormat {
    /// Query-string value; absent or blank means a spreadsheet.
    pub fn from_query(value: Option<&str>) -> Result<Self, ReportError> {
        match value.map(str::trim) {
            None | Some("") => Ok(ReportFormat::Excel),
            Some(v) => v.parse(),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Excel => "xlsx",
            ReportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ReportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excel" => Ok(ReportFormat::Excel),
            "pdf" => Ok(ReportFormat::Pdf),
            _ => Err(ReportError::InvalidFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Numbers rounded to two places
    pub fn number(value: f64) -> Self {
        Cell::Number((value * 100.0).round() / 100.0)
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Number(n) if n.fract() == 0.0 => format!("{:.0}", n),
            Cell::Number(n) => format!("{:.2}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub tables: Vec<Table>,
}

impl ReportDocument {
    pub fn render(&self, format: ReportFormat) -> Result<Vec<u8>, ReportError> {
        match format {
            ReportFormat::Excel => Ok(excel::render(self)?),
            ReportFormat::Pdf => pdf::render(self),
        }
    }
}

/// A rendered report that has been saved to disk
#[derive(Debug, Clone)]
pub struct Report {
    pub file_name: String,
    pub path: PathBuf,
    pub format: ReportFormat,
    pub bytes: Vec<u8>,
}

const MARK_HEADERS: [&str; 7] = [
    "Experiments",
    "Practical",
    "Class Test Avg",
    "SLA Total",
    "Total",
    "Percentage",
    "Grade",
];

fn mark_cells(marks: &SubjectMarks) -> Vec<Cell> {
    let t = &marks.totals;
    vec![
        Cell::number(t.experiment_total),
        Cell::number(t.practical),
        Cell::number(t.class_test_average),
        Cell::number(t.sla_total),
        Cell::number(t.total),
        Cell::number(t.percentage),
        Cell::text(grade(t.percentage)),
    ]
}

fn headers_with(prefix: &[&'static str]) -> Vec<&'static str> {
    prefix.iter().chain(MARK_HEADERS.iter()).copied().collect()
}

/// Every student with their per-subject totals
pub fn all_students_document(records: &[(Student, Vec<SubjectMarks>)]) -> ReportDocument {
    let mut students = Table::new(
        "Students",
        &["Student ID", "Name", "Email", "Phone", "Admission Year", "Current Year"],
    );
    let mut marks = Table::new("Marks", &headers_with(&["Student ID", "Name", "Subject", "Year"]));

    for (student, subjects) in records {
        students.rows.push(vec![
            Cell::Number(student.student_id as f64),
            Cell::text(&student.name),
            Cell::text(&student.email),
            Cell::text(&student.phone),
            Cell::Number(student.admission_year as f64),
            Cell::Number(student.current_year as f64),
        ]);
        for subject_marks in subjects {
            let mut row = vec![
                Cell::Number(student.student_id as f64),
                Cell::text(&student.name),
                Cell::text(&subject_marks.subject.subject_name),
                Cell::Number(subject_marks.subject.year as f64),
            ];
            row.extend(mark_cells(subject_marks));
            marks.rows.push(row);
        }
    }

    ReportDocument {
        title: "Student Marks Report".to_string(),
        tables: vec![students, marks],
    }
}

pub fn student_document(student: &Student, subjects: &[SubjectMarks]) -> ReportDocument {
    let mut profile = Table::new("Student", &["Field", "Value"]);
    for (field, value) in [
        ("Student ID", student.student_id.to_string()),
        ("Name", student.name.clone()),
        ("Email", student.email.clone()),
        ("Phone", student.phone.clone()),
        ("Date of Birth", student.dob.clone()),
        ("Gender", student.gender.clone()),
        ("Admission Year", student.admission_year.to_string()),
        ("Current Year", student.current_year.to_string()),
    ] {
        profile.rows.push(vec![Cell::text(field), Cell::text(value)]);
    }

    let mut marks = Table::new("Marks", &headers_with(&["Subject", "Year"]));
    for subject_marks in subjects {
        let mut row = vec![
            Cell::text(&subject_marks.subject.subject_name),
            Cell::Number(subject_marks.subject.year as f64),
        ];
        row.extend(mark_cells(subject_marks));
        marks.rows.push(row);
    }

    let mut experiments = Table::new("Experiments", &["Subject", "Experiment", "Marks"]);
    for subject_marks in subjects {
        for e in &subject_marks.experiments {
            experiments.rows.push(vec![
                Cell::text(&subject_marks.subject.subject_name),
                Cell::Number(e.experiment_number as f64),
                Cell::number(e.marks_obtained),
            ]);
        }
    }

    ReportDocument {
        title: format!("Student Report: {}", student.name),
        tables: vec![profile, marks, experiments],
    }
}

/// Cohort marks, per-category statistics and the grade distribution
pub fn subject_document(subject: &Subject, cohort: &[(Student, SubjectMarks)]) -> ReportDocument {
    let mut marks = Table::new("Marks", &headers_with(&["Student ID", "Name"]));
    for (student, subject_marks) in cohort {
        let mut row = vec![Cell::Number(student.student_id as f64), Cell::text(&student.name)];
        row.extend(mark_cells(subject_marks));
        marks.rows.push(row);
    }

    let column =
        |f: fn(&SubjectMarks) -> f64| -> Vec<f64> { cohort.iter().map(|(_, m)| f(m)).collect() };
    let categories: [(&str, Vec<f64>); 5] = [
        ("Experiments", column(|m| m.totals.experiment_total)),
        ("Practical", column(|m| m.totals.practical)),
        ("Class Test Avg", column(|m| m.totals.class_test_average)),
        ("SLA Total", column(|m| m.totals.sla_total)),
        ("Overall", column(|m| m.totals.total)),
    ];

    let mut statistics = Table::new(
        "Statistics",
        &["Category", "Count", "Mean", "Max", "Min", "Std Dev"],
    );
    for (name, values) in &categories {
        let s = Summary::of(values);
        statistics.rows.push(vec![
            Cell::text(*name),
            Cell::Number(s.count as f64),
            Cell::number(s.mean),
            Cell::number(s.max),
            Cell::number(s.min),
            Cell::number(s.std_dev),
        ]);
    }

    let mut grades = Table::new("Grade Distribution", &["Grade", "Students"]);
    for (g, count) in grade_distribution(&column(|m| m.totals.percentage)) {
        grades.rows.push(vec![Cell::text(g), Cell::Number(count as f64)]);
    }

    ReportDocument {
        title: format!("Subject Report: {} (Year {})", subject.subject_name, subject.year),
        tables: vec![marks, statistics, grades],
    }
}

pub fn file_name(scope: &str, id: Option<i64>, date: &str, format: ReportFormat) -> String {
    match id {
        Some(id) => format!("{}_{}_report_{}.{}", scope, id, date, format.extension()),
        None => format!("{}_report_{}.{}", scope, date, format.extension()),
    }
}

/// Write `bytes` beside the final path first so readers never see a partial file.
async fn write_atomically(
    dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, std::io::Error> {
    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(file_name);
    let temp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    if let Err(e) = tokio::fs::write(&temp, bytes).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp, &target).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(target)
}

#[derive(Clone)]
pub struct ReportService {
    pool: SqlitePool,
    directory: PathBuf,
}

impl ReportService {
    pub fn new(pool: SqlitePool, directory: PathBuf) -> Self {
        Self { pool, directory }
    }

    fn marks(&self) -> MarksService {
        MarksService::new(self.pool.clone())
    }

    pub async fn all_students(&self, format: ReportFormat) -> Result<Report, ReportError> {
        let students = StudentService::new(self.pool.clone()).list_all().await?;
        let marks = self.marks();

        let mut records = Vec::with_capacity(students.len());
        for student in students {
            let subjects = marks.student_marks(student.student_id).await?;
            records.push((student, subjects));
        }

        self.publish(all_students_document(&records), "students", None, format)
            .await
    }

    pub async fn student(
        &self,
        student_id: i64,
        format: ReportFormat,
    ) -> Result<Report, ReportError> {
        let student = Repository::<Student>::new(self.pool.clone())
            .select_404(student_id)
            .await?;
        let subjects = self.marks().student_marks(student_id).await?;

        self.publish(student_document(&student, &subjects), "student", Some(student_id), format)
            .await
    }

    pub async fn subject(
        &self,
        subject_id: i64,
        format: ReportFormat,
    ) -> Result<Report, ReportError> {
        let subject = Repository::<Subject>::new(self.pool.clone())
            .select_404(subject_id)
            .await?;
        let students = StudentService::new(self.pool.clone())
            .list_by_year(subject.year)
            .await?;
        let marks = self.marks();

        let mut cohort = Vec::with_capacity(students.len());
        for student in students {
            let subject_marks = marks.subject_marks(student.student_id, subject.clone()).await?;
            cohort.push((student, subject_marks));
        }

        self.publish(subject_document(&subject, &cohort), "subject", Some(subject_id), format)
            .await
    }

    async fn publish(
        &self,
        document: ReportDocument,
        scope: &str,
        id: Option<i64>,
        format: ReportFormat,
    ) -> Result<Report, ReportError> {
        let date = chrono::Local::now().format("%Y%m%d").to_string();
        let file_name = file_name(scope, id, &date, format);

        let bytes = document.render(format).map_err(|e| {
            error!("Failed to render {}: {}", file_name, e);
            e
        })?;
        let path = write_atomically(&self.directory, &file_name, &bytes)
            .await
            .map_err(|e| {
                error!("Failed to write {}: {}", file_name, e);
                e
            })?;

        info!("Generated report {} ({} bytes)", path.display(), bytes.len());
        Ok(Report {
            file_name,
            path,
            format,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{ClassTestMark, ExperimentMark, PracticalMark};

    fn student(id: i64, name: &str) -> Student {
        Student {
            student_id: id,
            name: name.to_string(),
            email: format!("s{}@college.edu", id),
            phone: format!("90000000{:02}", id),
            dob: "2004-01-01".to_string(),
            gender: "F".to_string(),
            address: "Campus".to_string(),
            admission_year: 2023,
            current_year: 2,
        }
    }

    fn subject() -> Subject {
        Subject {
            subject_id: 1,
            subject_name: "Data Structures".to_string(),
            year: 2,
        }
    }

    fn marks_for(student_id: i64, experiment: f64, practical: f64) -> SubjectMarks {
        SubjectMarks::new(
            subject(),
            vec![ExperimentMark {
                experiment_marks_id: student_id,
                student_id,
                subject_id: 1,
                experiment_number: 1,
                marks_obtained: experiment,
            }],
            Some(PracticalMark {
                practical_marks_id: student_id,
                student_id,
                subject_id: 1,
                practical_exam_marks: practical,
            }),
            Some(ClassTestMark {
                class_test_marks_id: student_id,
                student_id,
                subject_id: 1,
                class_test_1: 70.0,
                class_test_2: 80.0,
                average_marks: 75.0,
            }),
            None,
        )
    }

    #[test]
    fn format_parsing() {
        assert_eq!(ReportFormat::from_query(None).unwrap(), ReportFormat::Excel);
        assert_eq!(ReportFormat::from_query(Some("")).unwrap(), ReportFormat::Excel);
        assert_eq!(ReportFormat::from_query(Some("PDF")).unwrap(), ReportFormat::Pdf);
        assert!(matches!(
            ReportFormat::from_query(Some("csv")),
            Err(ReportError::InvalidFormat(f)) if f == "csv"
        ));
    }

    #[test]
    fn file_names_follow_scope() {
        assert_eq!(
            file_name("student", Some(5), "20240301", ReportFormat::Excel),
            "student_5_report_20240301.xlsx"
        );
        assert_eq!(
            file_name("students", None, "20240301", ReportFormat::Pdf),
            "students_report_20240301.pdf"
        );
    }

    #[test]
    fn cell_display_rounds() {
        assert_eq!(Cell::number(75.0).display(), "75");
        assert_eq!(Cell::number(56.666_666).display(), "56.67");
        assert_eq!(Cell::text("A+").display(), "A+");
    }

    #[test]
    fn subject_document_statistics() {
        let cohort = vec![
            (student(1, "Asha"), marks_for(1, 20.0, 80.0)),
            (student(2, "Ravi"), marks_for(2, 10.0, 60.0)),
        ];
        let doc = subject_document(&subject(), &cohort);

        assert_eq!(doc.title, "Subject Report: Data Structures (Year 2)");
        let stats = &doc.tables[1];
        let experiments = &stats.rows[0];
        assert_eq!(experiments[0], Cell::text("Experiments"));
        assert_eq!(experiments[1], Cell::Number(2.0));
        assert_eq!(experiments[2], Cell::Number(15.0));
        assert_eq!(experiments[5], Cell::Number(5.0));

        // Totals: 175 (43.75%) and 145 (36.25%), both F
        let grades = &doc.tables[2];
        let f_row = grades.rows.last().unwrap();
        assert_eq!(f_row, &vec![Cell::text("F"), Cell::Number(2.0)]);
    }

    #[test]
    fn student_document_lists_each_subject() {
        let doc = student_document(&student(3, "Meena"), &[marks_for(3, 25.0, 90.0)]);
        let marks = &doc.tables[1];
        assert_eq!(marks.rows.len(), 1);
        // Experiments, Practical, Class Test Avg, SLA, Total
        assert_eq!(
            marks.rows[0][2..7].to_vec(),
            vec![
                Cell::Number(25.0),
                Cell::Number(90.0),
                Cell::Number(75.0),
                Cell::Number(0.0),
                Cell::Number(190.0),
            ]
        );
        assert_eq!(marks.rows[0][7], Cell::Number(47.5));
        assert_eq!(doc.tables[2].rows.len(), 1);
    }

    #[tokio::test]
    async fn atomic_write_leaves_only_the_target() {
        let dir = std::env::temp_dir().join(format!("markbook-report-{}", Uuid::new_v4().simple()));
        let path = write_atomically(&dir, "subject_1_report_20240301.pdf", b"%PDF-1.4")
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.4");
        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
