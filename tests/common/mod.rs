#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use markbook_api::config::AppConfig;
use markbook_api::database::DatabaseManager;
use markbook_api::{app, AppState};

pub const HOD_EMAIL: &str = "hod@example.com";
pub const HOD_PASSWORD: &str = "changeme";

static PHONE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Distinct phone number per call; phones are unique per table
pub fn next_phone() -> String {
    format!("9{:09}", PHONE_SEQ.fetch_add(1, Ordering::Relaxed))
}

/// Router over a fresh in-memory database with the default HOD bootstrapped
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub reports_dir: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_slice(&self.body).context("response body is not JSON")
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `name=value` part of Set-Cookie, ready to send back as a Cookie header
    pub fn session_cookie(&self) -> Option<String> {
        self.header(header::SET_COOKIE)
            .and_then(|c| c.split(';').next())
            .map(|c| c.trim().to_string())
    }
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let reports_dir = std::env::temp_dir()
            .join(format!("markbook-tests-{}", uuid::Uuid::new_v4().simple()));

        let mut config = AppConfig::development();
        config.database.url = "sqlite::memory:".to_string();
        config.database.max_connections = 1;
        config.security.bcrypt_cost = 4;
        config.reports.directory = reports_dir.clone();

        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::ensure_schema(&pool).await?;

        let state = AppState::new(pool, config);
        state.hods().ensure_default(&state.config.bootstrap).await?;

        Ok(Self {
            router: app(state.clone()),
            state,
            reports_dir,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        Ok(TestResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }

    pub async fn get(&self, uri: &str, cookie: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, None, Some(cookie)).await
    }

    pub async fn post(&self, uri: &str, body: Value, cookie: &str) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(body), Some(cookie)).await
    }

    pub async fn put(&self, uri: &str, body: Value, cookie: &str) -> Result<TestResponse> {
        self.request(Method::PUT, uri, Some(body), Some(cookie)).await
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, None, Some(cookie)).await
    }

    pub async fn login(&self, path: &str, email: &str, password: &str) -> Result<TestResponse> {
        self.request(
            Method::POST,
            path,
            Some(json!({ "email": email, "password": password })),
            None,
        )
        .await
    }

    /// Cookie header value for the bootstrapped HOD
    pub async fn hod_cookie(&self) -> Result<String> {
        let res = self.login("/api/hod/login", HOD_EMAIL, HOD_PASSWORD).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "HOD login failed: {}", res.status);
        res.session_cookie().context("login did not set a cookie")
    }

    pub async fn teacher_cookie(&self, email: &str, password: &str) -> Result<String> {
        let res = self.login("/api/teacher/login", email, password).await?;
        anyhow::ensure!(res.status == StatusCode::OK, "teacher login failed: {}", res.status);
        res.session_cookie().context("login did not set a cookie")
    }

    /// POST and return `data.<id_field>` of the created row
    pub async fn create(
        &self,
        uri: &str,
        body: Value,
        cookie: &str,
        id_field: &str,
    ) -> Result<i64> {
        let res = self.post(uri, body, cookie).await?;
        anyhow::ensure!(
            res.status == StatusCode::CREATED,
            "POST {} returned {}: {}",
            uri,
            res.status,
            String::from_utf8_lossy(&res.body)
        );
        res.json()?["data"][id_field]
            .as_i64()
            .with_context(|| format!("missing {} in response", id_field))
    }

    pub async fn create_subject(&self, cookie: &str, name: &str, year: i64) -> Result<i64> {
        self.create(
            "/api/hod/subjects",
            json!({ "subject_name": name, "year": year }),
            cookie,
            "subject_id",
        )
        .await
    }

    pub async fn create_student(
        &self,
        cookie: &str,
        name: &str,
        email: &str,
        current_year: i64,
    ) -> Result<i64> {
        self.create(
            "/api/hod/students",
            json!({
                "name": name,
                "email": email,
                "phone": next_phone(),
                "dob": "2004-05-17",
                "gender": "F",
                "address": "12 Hill Road",
                "admission_year": 2023,
                "current_year": current_year
            }),
            cookie,
            "student_id",
        )
        .await
    }

    pub async fn create_teacher(
        &self,
        cookie: &str,
        email: &str,
        password: &str,
        subject_id: i64,
    ) -> Result<i64> {
        self.create(
            "/api/hod/teachers",
            json!({
                "name": "Ravi Kumar",
                "email": email,
                "phone": next_phone(),
                "password": password,
                "subject_id": subject_id
            }),
            cookie,
            "teacher_id",
        )
        .await
    }

    /// Files currently in the reports directory
    pub fn report_files(&self) -> Vec<String> {
        std::fs::read_dir(&self.reports_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.reports_dir);
    }
}
