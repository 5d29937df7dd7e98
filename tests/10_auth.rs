mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;

use common::{TestApp, HOD_EMAIL, HOD_PASSWORD};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.request(Method::GET, "/health", None, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json()?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], "ok");

    let banner = app.request(Method::GET, "/", None, None).await?;
    assert_eq!(banner.status, StatusCode::OK);
    assert_eq!(banner.json()?["data"]["name"], "Markbook API");
    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.login("/api/hod/login", HOD_EMAIL, "wrong-password").await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let body = res.json()?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid credentials");
    assert!(res.header(header::SET_COOKIE).is_none());

    let unknown = app.login("/api/hod/login", "nobody@example.com", HOD_PASSWORD).await?;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.json()?["error"], "Invalid credentials");
    Ok(())
}

#[tokio::test]
async fn login_sets_http_only_cookie() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.login("/api/hod/login", "  HOD@Example.com ", HOD_PASSWORD).await?;
    assert_eq!(res.status, StatusCode::OK);
    let set_cookie = res.header(header::SET_COOKIE).unwrap_or_default();
    assert!(set_cookie.starts_with("session_id="));
    assert!(set_cookie.contains("HttpOnly"));

    let body = res.json()?;
    assert_eq!(body["data"]["role"], "hod");
    assert_eq!(body["data"]["user"]["email"], HOD_EMAIL);
    assert!(body["data"]["user"].get("password_hash").is_none());

    let cookie = res.session_cookie().unwrap_or_default();
    let me = app.get("/api/hod/me", &cookie).await?;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()?["data"]["email"], HOD_EMAIL);
    Ok(())
}

#[tokio::test]
async fn unauthenticated_get_redirects_to_login() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.request(Method::GET, "/api/hod/students", None, None).await?;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(
        res.header(header::LOCATION),
        Some("/login/hod?redirect=%2Fapi%2Fhod%2Fstudents")
    );

    let teacher = app
        .request(Method::GET, "/api/teacher/report/subject?format=pdf", None, None)
        .await?;
    assert_eq!(teacher.status, StatusCode::SEE_OTHER);
    assert_eq!(
        teacher.header(header::LOCATION),
        Some("/login/teacher?redirect=%2Fapi%2Fteacher%2Freport%2Fsubject%3Fformat%3Dpdf")
    );

    // The redirect target is served and hands back the original path
    let location = teacher.header(header::LOCATION).unwrap_or_default().to_string();
    let page = app.request(Method::GET, &location, None, None).await?;
    assert_eq!(page.status, StatusCode::OK);
    let body = page.json()?;
    assert_eq!(body["data"]["login"], "/api/teacher/login");
    assert_eq!(body["data"]["redirect"], "/api/teacher/report/subject?format=pdf");
    Ok(())
}

#[tokio::test]
async fn quoted_session_cookie_is_accepted() -> Result<()> {
    let app = TestApp::spawn().await?;
    let cookie = app.hod_cookie().await?;
    let token = cookie.trim_start_matches("session_id=");

    let quoted = format!("theme=dark; session_id=\"{}\"", token);
    let res = app.get("/api/hod/me", &quoted).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()?["data"]["email"], HOD_EMAIL);
    Ok(())
}

#[tokio::test]
async fn unauthenticated_write_is_401_and_nothing_changes() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app
        .request(
            Method::POST,
            "/api/hod/subjects",
            Some(json!({ "subject_name": "Networks", "year": 3 })),
            Some("session_id=forged"),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let body = res.json()?;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unauthorized");

    let cookie = app.hod_cookie().await?;
    let subjects = app.get("/api/hod/subjects", &cookie).await?;
    assert_eq!(subjects.json()?["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn roles_do_not_cross() -> Result<()> {
    let app = TestApp::spawn().await?;
    let hod = app.hod_cookie().await?;
    let subject = app.create_subject(&hod, "Data Structures", 2).await?;
    app.create_teacher(&hod, "ravi@college.edu", "teacher-pass", subject).await?;
    let teacher = app.teacher_cookie("ravi@college.edu", "teacher-pass").await?;

    // A teacher session is not a HOD session, and vice versa
    let res = app.get("/api/hod/me", &teacher).await?;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    let res = app.delete("/api/hod/subjects/1", &teacher).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    let res = app.get("/api/teacher/me", &hod).await?;
    assert_eq!(res.status, StatusCode::SEE_OTHER);

    let me = app.get("/api/teacher/me", &teacher).await?;
    assert_eq!(me.status, StatusCode::OK);
    let body = me.json()?;
    assert_eq!(body["data"]["email"], "ravi@college.edu");
    assert_eq!(body["data"]["subject"]["subject_name"], "Data Structures");
    Ok(())
}

#[tokio::test]
async fn logout_revokes_session() -> Result<()> {
    let app = TestApp::spawn().await?;
    let cookie = app.hod_cookie().await?;

    let res = app.request(Method::POST, "/api/logout", None, Some(&cookie)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.header(header::SET_COOKIE).unwrap_or_default().contains("Max-Age=0"));

    let after = app.get("/api/hod/me", &cookie).await?;
    assert_eq!(after.status, StatusCode::SEE_OTHER);

    // Logging out without a session is harmless
    let again = app.request(Method::POST, "/api/logout", None, None).await?;
    assert_eq!(again.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn second_login_evicts_first_session() -> Result<()> {
    let app = TestApp::spawn().await?;
    let first = app.hod_cookie().await?;
    let second = app.hod_cookie().await?;
    assert_ne!(first, second);

    assert_eq!(app.get("/api/hod/me", &first).await?.status, StatusCode::SEE_OTHER);
    assert_eq!(app.get("/api/hod/me", &second).await?.status, StatusCode::OK);
    assert_eq!(app.state.sessions.len().await, 1);
    Ok(())
}
