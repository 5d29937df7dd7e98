use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::reports::ReportService;
use crate::services::{HodService, MarksService, StudentService, SubjectService, TeacherService};
use crate::session::SessionStore;

/// Shared by every handler through axum's `State` extractor
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: AppConfig) -> Self {
        Self {
            pool,
            sessions: SessionStore::new(),
            config: Arc::new(config),
        }
    }

    pub fn hods(&self) -> HodService {
        HodService::new(self.pool.clone(), self.config.security.bcrypt_cost)
    }

    pub fn teachers(&self) -> TeacherService {
        TeacherService::new(self.pool.clone(), self.config.security.bcrypt_cost)
    }

    pub fn subjects(&self) -> SubjectService {
        SubjectService::new(self.pool.clone())
    }

    pub fn students(&self) -> StudentService {
        StudentService::new(self.pool.clone())
    }

    pub fn marks(&self) -> MarksService {
        MarksService::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.pool.clone(), self.config.reports.directory.clone())
    }
}
