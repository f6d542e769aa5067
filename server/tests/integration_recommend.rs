use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use scorer::RecommenderConfig;
use serde_json::Value;
use server::{build_app, AppOptions};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_tiny_dataset(dir: &Path) {
    fs::write(
        dir.join("jobs.json"),
        r#"[
            {"_id":"frontend","title":"Frontend Intern","skills":["React.js","CSS"],"location":{"city":"Pune"},"company":"Acme","type":"internship","stats":{"views":40}},
            {"_id":"backend","title":"Backend Intern","skills":["Rust","SQL"],"location":{"city":"Delhi"},"company":"Initech","type":"internship","stats":{"views":90}},
            {"_id":"design","title":"Product Designer","skills":["Figma"],"location":{"city":"Pune"},"type":"full-time","stats":{"views":10}}
        ]"#,
    )
    .unwrap();
    fs::write(
        dir.join("applications.jsonl"),
        [
            r#"{"jobseekerId":"asha","jobId":"frontend","status":"pending"}"#,
            r#"{"jobseekerId":"ravi","jobId":"frontend","status":"rejected"}"#,
            r#"{"jobseekerId":"ravi","jobId":"design","status":"accepted"}"#,
        ]
        .join("\n"),
    )
    .unwrap();
    fs::write(
        dir.join("interactions.jsonl"),
        r#"{"userId":"asha","jobId":"frontend","type":"save"}"#,
    )
    .unwrap();
}

fn app_for(dir: &Path, admin_token: Option<&str>) -> Router {
    build_app(AppOptions {
        data_dir: dir.to_path_buf(),
        config: RecommenderConfig::default(),
        admin_token: admin_token.map(str::to_string),
    })
    .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Bytes) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn health_reports_readiness() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let (status, body) = get(app_for(dir.path(), None), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ready"], true);
}

#[tokio::test]
async fn popular_jobs_are_ranked_by_views() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let (status, body) = get(app_for(dir.path(), None), "/jobs/popular?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["jobId"], "backend");
    assert_eq!(arr[1]["jobId"], "frontend");
    assert_eq!(arr[0]["method"], "popular");
}

#[tokio::test]
async fn warmed_profile_drives_content_recommendations() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let app = app_for(dir.path(), None);

    let (status, body) = get(app.clone(), "/users/asha/profile").await;
    assert_eq!(status, StatusCode::OK);
    let profile: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(profile["interactions"][0]["weight"], 3);
    assert!(profile["skills"].as_array().unwrap().iter().any(|s| s == "react.js"));

    let (status, body) = get(app, "/users/asha/recommendations?method=content-based&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["jobId"], "frontend");
    assert_eq!(results[0]["method"], "content-based");
}

#[tokio::test]
async fn hybrid_includes_collaborative_signal() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let (status, body) = get(app_for(dir.path(), None), "/users/asha/recommendations").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["method"], "hybrid");
    let design = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["jobId"] == "design")
        .expect("design recommended");
    assert!(design["reasons"].as_array().unwrap().iter().any(|r| r.as_str().unwrap().contains("accepted")));
}

#[tokio::test]
async fn interactions_replace_profile() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let app = app_for(dir.path(), None);
    let req = Request::put("/users/neel/interactions")
        .header("content-type", "application/json")
        .body(Body::from(r#"[{"jobId":"backend","type":"apply"},{"jobId":"backend","type":"view"}]"#))
        .unwrap();
    let (status, body) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    let profile: Value = serde_json::from_slice(&body).unwrap();
    let weights: Vec<u64> = profile["interactions"].as_array().unwrap().iter().map(|i| i["weight"].as_u64().unwrap()).collect();
    assert_eq!(weights, [5, 1]);
    assert!(profile["skills"].as_array().unwrap().iter().any(|s| s == "rust"));

    let (status, _) = get(app, "/users/neel/profile").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_method_is_rejected_and_unknown_profile_is_404() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let app = app_for(dir.path(), None);
    let (status, _) = get(app.clone(), "/users/asha/recommendations?method=tarot").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(app, "/users/ghost/profile").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn explanation_falls_back_for_unknown_method() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let (status, body) = get(app_for(dir.path(), None), "/users/asha/recommendations/design/explanation?method=tarot").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["explanation"], scorer::explain::DEFAULT_EXPLANATION);
    assert_eq!(json["jobId"], "design");
}

#[tokio::test]
async fn reload_requires_admin_token() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let app = app_for(dir.path(), Some("secret"));

    let (status, _) = send(app.clone(), Request::post("/admin/reload").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    fs::write(dir.path().join("jobs-extra.json"), r#"{"_id":"data","stats":{"views":500}}"#).unwrap();
    let req = Request::post("/admin/reload").header("X-ADMIN-TOKEN", "secret").body(Body::empty()).unwrap();
    let (status, body) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["jobs"], 4);

    let (_, body) = get(app, "/jobs/popular?limit=1").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json[0]["jobId"], "data");
}

#[tokio::test]
async fn interactions_with_missing_fields_are_accepted() {
    let dir = tempdir().unwrap();
    write_tiny_dataset(dir.path());
    let app = app_for(dir.path(), None);
    let req = Request::put("/users/mira/interactions")
        .header("content-type", "application/json")
        .body(Body::from(r#"[{"jobId":"design"},{"jobId":"backend","type":null,"timestamp":"yesterday","job":"backend"}]"#))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    let profile: Value = serde_json::from_slice(&body).unwrap();
    let weights: Vec<u64> = profile["interactions"].as_array().unwrap().iter().map(|i| i["weight"].as_u64().unwrap()).collect();
    assert_eq!(weights, [1, 1]);
    assert!(profile["skills"].as_array().unwrap().iter().any(|s| s == "figma"));
    assert!(profile["skills"].as_array().unwrap().iter().any(|s| s == "rust"));
}
