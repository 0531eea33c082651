//! End-to-end coverage of the Drop Lifecycle Coordinator's HTTP surface:
//! create, preview, download, mutate, and delete, driven through the full
//! router via `tower::ServiceExt::oneshot`.

mod support;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn multipart_body(boundary: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    multipart_body_with_fields(boundary, file_name, content, &[])
}

/// Same as [`multipart_body`] but with extra `name=value` text fields placed
/// before the `file` part (multipart fields after `file` are not visible to
/// a streaming handler — see DESIGN.md's Open Question decision on field
/// ordering).
fn multipart_body_with_fields(boundary: &str, file_name: &str, content: &[u8], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"title\"\r\n\r\n");
    body.extend_from_slice(b"my upload\r\n");
    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
        body.extend_from_slice(format!("{value}\r\n").as_bytes());
    }
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

async fn create_drop(app: &axum::Router, fields: &[(&str, &str)], content: &[u8]) -> Value {
    let boundary = "teledropboundary";
    let body = multipart_body_with_fields(boundary, "f.bin", content, fields);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_then_preview_then_download_round_trips() {
    let (app, _dir) = support::test_app();
    let boundary = "teledropboundary";
    let body = multipart_body(boundary, "notes.txt", b"hello from teledrop");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let slug = created["slug"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "my upload");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}/preview"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"hello from teledrop");
}

#[tokio::test]
async fn range_request_returns_partial_content() {
    let (app, _dir) = support::test_app();
    let boundary = "teledropboundary";
    let body = multipart_body(boundary, "notes.txt", b"0123456789");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = json_body(response).await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}"))
                .header("range", "bytes=2-5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers().get("content-range").unwrap(), "bytes 2-5/10");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"2345");
}

#[tokio::test]
async fn unknown_slug_is_not_found() {
    let (app, _dir) = support::test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/content/doesnotexist/preview")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn keycheck_reports_slug_availability() {
    let (app, _dir) = support::test_app();
    let boundary = "teledropboundary";
    let body = multipart_body(boundary, "f.bin", b"x");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = json_body(response).await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/keycheck/{slug}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let result = json_body(response).await;
    assert_eq!(result["exists"], true);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/content/keycheck/never-used-slug")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let result = json_body(response).await;
    assert_eq!(result["exists"], false);
}

/// A drop can be created already favorited in one request — the `favorite`
/// multipart field must not be swallowed by the create handler.
#[tokio::test]
async fn create_accepts_the_favorite_field() {
    let (app, _dir) = support::test_app();
    let created = create_drop(&app, &[("favorite", "true")], b"x").await;
    assert_eq!(created["favorite"], true);
}

/// §8 scenario: password-protected anonymous access — required, then
/// invalid, then correct.
#[tokio::test]
async fn password_protected_drop_rejects_missing_then_wrong_then_accepts_correct_passphrase() {
    let (app, _dir) = support::test_app();
    let created = create_drop(&app, &[("password", "open")], b"secret payload").await;
    let slug = created["slug"].as_str().unwrap().to_string();
    assert_eq!(created["has_passphrase"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}/preview"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "password_required");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}/preview?password=shut"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "password_invalid");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}/preview?password=open"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// §8 scenario: the owner bypasses a passphrase on their own drop.
#[tokio::test]
async fn owner_bypasses_passphrase_without_supplying_one() {
    let (app, _dir) = support::test_app();
    let token = support::owner_token();

    let boundary = "teledropboundary";
    let body = multipart_body_with_fields(boundary, "f.bin", b"owner only", &[("password", "shh")]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = json_body(response).await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}/preview"))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// §8 scenario: a private drop denies anonymous access with `AuthRequired`
/// and a non-owner identity with `Forbidden`; the owner is allowed.
#[tokio::test]
async fn private_drop_distinguishes_unauthenticated_from_wrong_identity() {
    let (app, _dir) = support::test_app();
    let token = support::owner_token();

    let boundary = "teledropboundary";
    let body = multipart_body_with_fields(boundary, "f.bin", b"shh", &[("private", "true")]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("authorization", format!("Bearer {token}"))
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = json_body(response).await;
    assert_eq!(created["private"], true);
    let slug = created["slug"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}/preview"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "auth_required");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/content/{slug}/preview"))
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// §8 scenario: a second create with the same user-supplied slug is
/// rejected with `409 slug_taken` and leaves no new blob behind.
#[tokio::test]
async fn duplicate_user_supplied_slug_is_rejected_with_409() {
    let (app, dir) = support::test_app();
    let boundary = "teledropboundary";

    let first = multipart_body_with_fields(boundary, "a.bin", b"first", &[("slug", "dup")]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(first))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let blobs_after_first = count_blob_files(dir.path());

    let second = multipart_body_with_fields(boundary, "b.bin", b"second", &[("slug", "dup")]);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(second))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["error"], "slug_taken");

    assert_eq!(
        count_blob_files(dir.path()),
        blobs_after_first,
        "the rejected second upload must leave no blob behind"
    );
}

fn count_blob_files(root: &std::path::Path) -> usize {
    fn walk(dir: &std::path::Path, count: &mut usize) {
        let Ok(entries) = std::fs::read_dir(dir) else { return };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, count);
            } else {
                *count += 1;
            }
        }
    }
    let mut count = 0;
    walk(root, &mut count);
    count
}

/// §8's size cap property: an upload of exactly the cap succeeds; one byte
/// over fails with `413 size_limit_exceeded` and leaves no blob or row.
#[tokio::test]
async fn upload_at_the_cap_succeeds_one_byte_over_is_rejected() {
    let (app, dir) = support::test_app_with_max_upload(8);
    let boundary = "teledropboundary";

    let at_cap = multipart_body(boundary, "ok.bin", b"12345678");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(at_cap))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["file_size"], 8);

    let blobs_after_first = count_blob_files(dir.path());

    let over_cap = multipart_body(boundary, "over.bin", b"123456789");
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(over_cap))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"], "size_limit_exceeded");
    assert_eq!(
        count_blob_files(dir.path()),
        blobs_after_first,
        "a rejected oversized upload must leave no blob behind"
    );
}

/// Owner-only mutation surface: detail, permission, favorite, password
/// set/reset, and delete — exercised end-to-end through the router.
#[tokio::test]
async fn owner_mutation_surface_round_trips() {
    let (app, _dir) = support::test_app();
    let token = support::owner_token();
    let auth = format!("Bearer {token}");

    let boundary = "teledropboundary";
    let body = multipart_body_with_fields(boundary, "f.bin", b"mutable", &[]);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("authorization", &auth)
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = json_body(response).await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/content/{slug}/detail"))
                .header("authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"title": "renamed"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["title"], "renamed");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/content/{slug}/permission"))
                .header("authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"private": true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["private"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/content/{slug}/favorite"))
                .header("authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"favorite": true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["favorite"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/content/{slug}/password"))
                .header("authorization", &auth)
                .header("content-type", "application/json")
                .body(Body::from(r#"{"new_password": "newpass"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["has_passphrase"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/content/{slug}/reset"))
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["has_passphrase"], false);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/content/{slug}"))
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// §8's idempotent-delete property: deleting an already-deleted drop
/// returns `404`, not an internal error.
#[tokio::test]
async fn deleting_an_already_deleted_drop_is_not_found() {
    let (app, _dir) = support::test_app();
    let token = support::owner_token();
    let auth = format!("Bearer {token}");

    let boundary = "teledropboundary";
    let body = multipart_body(boundary, "f.bin", b"once");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/content")
                .header("authorization", &auth)
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let slug = created["slug"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/content/{slug}"))
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/content/{slug}"))
                .header("authorization", &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
