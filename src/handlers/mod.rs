// handlers/mod.rs - Handlers grouped by who may call them
//
// public  → no session (banner, health, login, logout)
// hod     → HOD session required (/api/hod/*)
// teacher → Teacher session required (/api/teacher/*)
pub mod hod;
pub mod public;
pub mod teacher;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::reports::{Report, ReportFormat};

/// `?format=excel|pdf` on report routes
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
}

impl ReportQuery {
    pub fn format(&self) -> Result<ReportFormat, ApiError> {
        Ok(ReportFormat::from_query(self.format.as_deref())?)
    }
}

/// Send a generated report as a file download
pub fn attachment(report: Report) -> Response {
    (
        [
            (header::CONTENT_TYPE, report.format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.file_name),
            ),
        ],
        report.bytes,
    )
        .into_response()
}
