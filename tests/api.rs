//! End-to-end tests over the application router.

use std::fs;
use std::path::Path;

use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use clipquiz::catalog::{build_catalog, CatalogStore};
use clipquiz::handlers;
use clipquiz::state::AppState;

fn write_file(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

fn add_clip(root: &Path, rel: &str, annotation: &Value) {
    write_file(root, &format!("{rel}.mp4"), b"\x00\x00\x00\x18ftypmp42");
    write_file(root, &format!("{rel}.json"), annotation.to_string().as_bytes());
}

fn server_over(root: &Path) -> TestServer {
    let catalog = CatalogStore::new(build_catalog(root));
    let state = AppState::new(catalog, root.to_path_buf());
    TestServer::new(handlers::router(state)).unwrap()
}

fn annotation(title: &str) -> Value {
    json!({
        "meta": {"mode": "study", "type": "reel", "title_en": title},
        "items": {"grammar": [{"id": "g1"}], "vocab": [{"id": "v1"}]},
        "quiz": [
            {"type": "mc_meaning", "prompt_en": "?", "targets": ["g1"],
             "payload": {"options": ["a", "b"]}, "answer": {"correct_index": 0}}
        ]
    })
}

#[tokio::test]
async fn test_index_liveness_line() {
    let temp = TempDir::new().unwrap();
    let server = server_over(temp.path());

    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("/api/entries"));
}

#[tokio::test]
async fn test_health_reports_entry_count() {
    let temp = TempDir::new().unwrap();
    add_clip(temp.path(), "a", &annotation("A"));
    add_clip(temp.path(), "b", &annotation("B"));
    let server = server_over(temp.path());

    let response = server.get("/api/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["entries"], json!(2));
}

#[tokio::test]
async fn test_health_with_missing_content_root() {
    let server = server_over(Path::new("/nonexistent/clipquiz-root"));

    let response = server.get("/api/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["entries"], json!(0));
}

#[tokio::test]
async fn test_entries_sorted_case_insensitively() {
    let temp = TempDir::new().unwrap();
    add_clip(temp.path(), "one", &annotation("banana split"));
    add_clip(temp.path(), "two", &annotation("Apple"));
    add_clip(temp.path(), "three", &annotation("cherry"));
    let server = server_over(temp.path());

    let response = server.get("/api/entries").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Apple", "banana split", "cherry"]);
}

#[tokio::test]
async fn test_entries_omit_bodies() {
    let temp = TempDir::new().unwrap();
    add_clip(temp.path(), "clip", &annotation("Clip"));
    let server = server_over(temp.path());

    let body: Value = server.get("/api/entries").await.json();
    let summary = &body[0];

    assert_eq!(summary["id"], "clip");
    assert_eq!(summary["counts"]["quiz"], 1);
    assert_eq!(summary["video_url"], "/data/clip.mp4");
    assert!(summary.get("items").is_none());
    assert!(summary.get("quiz").is_none());
}

#[tokio::test]
async fn test_entry_detail_roundtrip() {
    let temp = TempDir::new().unwrap();
    add_clip(temp.path(), "lesson/ramen", &annotation("Ordering ramen"));
    let server = server_over(temp.path());

    let response = server
        .get("/api/entry")
        .add_query_param("id", "lesson/ramen")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["title"], "Ordering ramen");
    assert_eq!(body["video_url"], "/data/lesson/ramen.mp4");
    assert_eq!(body["quiz"][0]["type"], "mc_meaning");
    assert_eq!(body["counts"]["grammar"], 1);
    assert_eq!(body["items"]["grammar"][0]["id"], "g1");
}

#[tokio::test]
async fn test_entry_detail_missing_id_param() {
    let temp = TempDir::new().unwrap();
    let server = server_over(temp.path());

    let response = server.get("/api/entry").await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "Missing id query param");
}

#[tokio::test]
async fn test_entry_detail_unknown_id() {
    let temp = TempDir::new().unwrap();
    let server = server_over(temp.path());

    let response = server.get("/api/entry").add_query_param("id", "ghost").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"], "Entry not found");
}

#[tokio::test]
async fn test_media_served_under_data() {
    let temp = TempDir::new().unwrap();
    add_clip(temp.path(), "clip", &annotation("Clip"));
    let server = server_over(temp.path());

    let response = server.get("/data/clip.mp4").await;
    response.assert_status_ok();
    assert!(!response.as_bytes().is_empty());
}

#[tokio::test]
async fn test_profile_pic_missing_id_param() {
    let temp = TempDir::new().unwrap();
    let server = server_over(temp.path());

    let response = server.get("/api/profile-pic").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_profile_pic_unknown_entry_or_missing_url() {
    let temp = TempDir::new().unwrap();
    add_clip(temp.path(), "bare", &annotation("Bare"));
    let server = server_over(temp.path());

    let response = server.get("/api/profile-pic").add_query_param("id", "ghost").await;
    response.assert_status_not_found();

    // Entry exists but carries no attribution block.
    let response = server.get("/api/profile-pic").add_query_param("id", "bare").await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_profile_pic_rejects_disallowed_host() {
    let temp = TempDir::new().unwrap();
    add_clip(temp.path(), "clip", &annotation("Clip"));
    write_file(
        temp.path(),
        "clip.mp4.json",
        json!({"username": "sensei", "profile_pic_url": "https://evil.example.com/pic.jpg"})
            .to_string()
            .as_bytes(),
    );
    let server = server_over(temp.path());

    let response = server.get("/api/profile-pic").add_query_param("id", "clip").await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"], "Profile host not permitted");
}

#[tokio::test]
async fn test_malformed_annotation_still_listed() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "broken.mp4", b"x");
    write_file(temp.path(), "broken.json", b"{ not json");
    let server = server_over(temp.path());

    let body: Value = server.get("/api/entries").await.json();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "broken");
    assert_eq!(body[0]["counts"]["quiz"], 0);
}
