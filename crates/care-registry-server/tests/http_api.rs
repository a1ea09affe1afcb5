use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use care_registry_core::Database;
use care_registry_server::api_router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app_at(path: &Path) -> Router {
    let db = Database::open(path).unwrap();
    api_router(Arc::new(Mutex::new(db)))
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn tokens_and_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("registry.db");

    let (token, patient_id) = {
        let app = app_at(&path);
        let (status, issued) = call(
            &app,
            Method::POST,
            "/api/register",
            None,
            Some(json!({ "username": "dana", "email": "dana@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let token = issued["token"].as_str().unwrap().to_string();

        let (status, patient) = call(
            &app,
            Method::POST,
            "/api/patients",
            Some(&token),
            Some(json!({ "age": 52, "gender": "female", "medical_history": "Asthma" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        (token, patient["id"].as_str().unwrap().to_string())
    };

    let app = app_at(&path);
    let (status, patient) =
        call(&app, Method::GET, &format!("/api/patients/{patient_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patient["medical_history"], "Asthma");
    assert_eq!(patient["user"]["username"], "dana");
}

#[tokio::test]
async fn registration_rejects_blank_username() {
    let dir = TempDir::new().unwrap();
    let app = app_at(&dir.path().join("registry.db"));
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({ "username": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn patient_listing_only_shows_own_record() {
    let dir = TempDir::new().unwrap();
    let app = app_at(&dir.path().join("registry.db"));

    let mut tokens = Vec::new();
    for (name, age) in [("erin", 40), ("frank", 61)] {
        let (_, issued) = call(&app, Method::POST, "/api/register", None, Some(json!({ "username": name }))).await;
        let token = issued["token"].as_str().unwrap().to_string();
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/patients",
            Some(&token),
            Some(json!({ "age": age, "gender": "other", "medical_history": "Hypertension" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        tokens.push(token);
    }

    let (status, listed) = call(&app, Method::GET, "/api/patients", Some(&tokens[0]), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["age"], 40);
}
