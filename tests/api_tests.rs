use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use marlin::api::AppState;
use marlin::config::Config;
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "integration-secret";

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.admin_email = ADMIN_EMAIL.to_string();
    config.auth.admin_password = ADMIN_PASSWORD.to_string();
    config.storage.local_path = std::env::temp_dir()
        .join(format!("marlin-test-{}", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    config
}

async fn spawn_app_with(config: Config) -> (Router, Arc<AppState>) {
    let state = marlin::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let app = marlin::api::router(state.clone())
        .await
        .expect("Failed to build router");
    (app, state)
}

async fn spawn_app() -> (Router, Arc<AppState>) {
    spawn_app_with(test_config()).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

async fn login(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "email": ADMIN_EMAIL,
                        "password": ADMIN_PASSWORD,
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["data"]["token"].as_str().unwrap().to_string()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn authed_json(method: &str, uri: &str, token: &str, json: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn create_post(app: &Router, token: &str, json: serde_json::Value) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(authed_json("POST", "/api/posts", token, &json))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = spawn_app().await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn test_protected_endpoints_require_auth() {
    let (app, _) = spawn_app().await;

    for (method, uri) in [
        ("POST", "/api/posts"),
        ("DELETE", "/api/posts/1"),
        ("POST", "/api/landing"),
        ("POST", "/api/upload/image"),
        ("GET", "/api/auth/me"),
        ("GET", "/api/metrics"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_post_creation_defaults() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let post = create_post(
        &app,
        &token,
        serde_json::json!({ "title": "A", "content": "B" }),
    )
    .await;

    assert_eq!(post["title"], "A");
    assert_eq!(post["content"], "B");
    assert_eq!(post["category"], "general");
    assert_eq!(post["tags"], "");
    assert_eq!(post["published"], true);
    assert_eq!(post["created_at"], post["updated_at"]);
}

#[tokio::test]
async fn test_post_update_advances_updated_at() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let post = create_post(
        &app,
        &token,
        serde_json::json!({ "title": "Before", "content": "body" }),
    )
    .await;
    let id = post["id"].as_i64().unwrap();
    let created_at = post["created_at"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/api/posts/{id}"),
            &token,
            &serde_json::json!({ "title": "After" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await["data"].clone();
    assert_eq!(updated["title"], "After");
    // Untouched fields survive a partial update.
    assert_eq!(updated["content"], "body");
    assert!(updated["updated_at"].as_str().unwrap() > created_at.as_str());
}

#[tokio::test]
async fn test_unpublished_posts_hidden_from_anonymous() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    create_post(
        &app,
        &token,
        serde_json::json!({ "title": "Public", "content": "x" }),
    )
    .await;
    let draft = create_post(
        &app,
        &token,
        serde_json::json!({ "title": "Draft", "content": "x", "published": false }),
    )
    .await;
    let draft_id = draft["id"].as_i64().unwrap();

    let response = app.clone().oneshot(get("/api/posts")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Public");

    let response = app
        .clone()
        .oneshot(authed_get("/api/posts", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/posts/{draft_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/posts/{draft_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_semantics() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(authed_json(
            "DELETE",
            "/api/posts/9999",
            &token,
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let post = create_post(
        &app,
        &token,
        serde_json::json!({ "title": "Doomed", "content": "x" }),
    )
    .await;
    let id = post["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(authed_json(
            "DELETE",
            &format!("/api/posts/{id}"),
            &token,
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/posts/{id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_list_delete_scenario() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let post = create_post(
        &app,
        &token,
        serde_json::json!({ "title": "A", "content": "B" }),
    )
    .await;
    let id = post["id"].as_i64().unwrap();
    assert_eq!(post["category"], "general");
    assert_eq!(post["tags"], "");
    assert_eq!(post["published"], true);

    // Newest first.
    let response = app.clone().oneshot(get("/api/posts")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["id"].as_i64().unwrap(), id);

    let response = app
        .clone()
        .oneshot(authed_json(
            "DELETE",
            &format!("/api/posts/{id}"),
            &token,
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/posts")).await.unwrap();
    let body = body_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pages_lookup() {
    let (app, state) = spawn_app().await;
    let token = login(&app).await;

    state
        .store
        .create_page(&marlin::db::NewPage {
            title: "About".to_string(),
            slug: "about".to_string(),
            content: "Hello".to_string(),
            meta_description: String::new(),
            published: true,
            user_id: "seed".to_string(),
        })
        .await
        .unwrap();
    state
        .store
        .create_page(&marlin::db::NewPage {
            title: "Hidden".to_string(),
            slug: "hidden".to_string(),
            content: "Shh".to_string(),
            meta_description: String::new(),
            published: false,
            user_id: "seed".to_string(),
        })
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/api/pages/about")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["slug"], "about");

    let response = app.clone().oneshot(get("/api/pages/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.clone().oneshot(get("/api/pages/hidden")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(authed_get("/api/pages/hidden", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_singleton_settings_upsert() {
    let (app, state) = spawn_app().await;
    let token = login(&app).await;

    // Default document before any save.
    let response = app.clone().oneshot(get("/api/blog-settings")).await.unwrap();
    let body = body_json(response).await;
    assert!(body["data"].is_object());

    let first = serde_json::json!({ "title": "First" });
    let second = serde_json::json!({ "title": "Second", "postsPerPage": 5 });

    for doc in [&first, &second] {
        let response = app
            .clone()
            .oneshot(authed_json("POST", "/api/blog-settings", &token, doc))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Second write wins and exactly one row exists.
    let response = app.clone().oneshot(get("/api/blog-settings")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "Second");
    assert_eq!(body["data"]["postsPerPage"], 5);

    let row = state.store.get_blog_settings().await.unwrap().unwrap();
    assert_eq!(row.id, 1);

    // Non-object payloads are rejected.
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/blog-settings",
            &token,
            &serde_json::json!([1, 2, 3]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_landing_document_schema() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    // Unknown fields survive the save round-trip.
    let document = serde_json::json!({
        "hero": { "title": "Big", "theme": "dark" },
        "featuredPostIds": [1, 2, 3],
        "sections": [{ "kind": "text", "title": "One", "body": "..." }],
        "announcement": "hello"
    });

    let response = app
        .clone()
        .oneshot(authed_json("POST", "/api/landing", &token, &document))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/landing")).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["hero"]["theme"], "dark");
    assert_eq!(body["data"]["announcement"], "hello");
    assert_eq!(body["data"]["featuredPostIds"][2], 3);

    // Shape violations are rejected.
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/landing",
            &token,
            &serde_json::json!({ "featuredPostIds": ["not-a-number"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_image_local_backend() {
    let (app, state) = spawn_app().await;
    let token = login(&app).await;

    let boundary = "marlin-test-boundary";
    let png_bytes: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"photo.PNG\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(png_bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload/image")
                .header("Authorization", format!("Bearer {token}"))
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    // The file actually landed in the configured directory.
    let name = url.trim_start_matches("/uploads/");
    let local_path = {
        let config = state.config.read().await;
        config.storage.local_path.clone()
    };
    let stored = std::fs::read(std::path::Path::new(&local_path).join(name)).unwrap();
    assert_eq!(stored, png_bytes);
}

#[tokio::test]
async fn test_upload_requires_image_field() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let boundary = "marlin-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nhello\r\n--{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload/image")
                .header("Authorization", format!("Bearer {token}"))
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_storage_failure_is_bad_gateway() {
    let mut config = test_config();
    // Occupy the upload directory path with a regular file so every write
    // into it fails.
    std::fs::write(&config.storage.local_path, b"occupied").unwrap();
    let (app, _) = spawn_app_with(config).await;
    let token = login(&app).await;

    let boundary = "marlin-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
         filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n123\r\n--{boundary}--\r\n"
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload/image")
                .header("Authorization", format!("Bearer {token}"))
                .header(
                    "Content-Type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    // A backend fault is a 502 through the error envelope, never a soft
    // error inside a 200.
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_ai_generation_requires_provider_key() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    let request = serde_json::json!({
        "prompt": "generate_ideas",
        "currentData": { "title": "", "content": "", "category": "", "tags": "" }
    });

    // No key stored yet.
    let response = app
        .clone()
        .oneshot(authed_json("POST", "/api/ai/generate", &token, &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/global-settings",
            &token,
            &serde_json::json!({ "siteName": "Test", "ai_api_key": "sk-test" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json("POST", "/api/ai/generate", &token, &request))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["title"].is_string());

    // Unknown prompts acknowledge instead of failing.
    let response = app
        .clone()
        .oneshot(authed_json(
            "POST",
            "/api/ai/generate",
            &token,
            &serde_json::json!({ "prompt": "make_coffee" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["message"].is_string());
}

#[tokio::test]
async fn test_analytics_counts() {
    let (app, _) = spawn_app().await;
    let token = login(&app).await;

    create_post(
        &app,
        &token,
        serde_json::json!({ "title": "One", "content": "x" }),
    )
    .await;
    create_post(
        &app,
        &token,
        serde_json::json!({ "title": "Two", "content": "x", "published": false }),
    )
    .await;

    let response = app.clone().oneshot(get("/api/analytics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["total_posts"], 2);
    assert_eq!(body["data"]["published_posts"], 1);
    assert!(body["data"]["total_views"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_host_allow_list() {
    let mut config = test_config();
    config.server.allowed_hosts = vec!["blog.example.com".to_string()];
    let (app, _) = spawn_app_with(config).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Host", "evil.example.net")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("Host", "blog.example.com:8000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_headers_advisory() {
    let (app, _) = spawn_app().await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert!(response.headers().contains_key("x-ratelimit-limit"));
    assert!(response.headers().contains_key("x-ratelimit-remaining"));
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
