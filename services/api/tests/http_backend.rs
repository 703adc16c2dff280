//! Integration tests for the HTTP backend
//!
//! These tests stand up a small axum server that mimics the dashboard API
//! and check what the client sends and how it maps the responses.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use api::{
    ApiError, Backend, BackendConfig, HttpBackend, UnauthorizedSignal,
    models::{CreateVideoRequest, LoginRequest, TriggerRequest, VideoMethod},
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

const TOKEN: &str = "good-token";

#[derive(Clone, Default)]
struct Received {
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "correct horse" {
        (
            StatusCode::OK,
            Json(json!({
                "token": TOKEN,
                "user": {"id": 7, "usuario": "ana", "email": body["email"], "role": "artist"}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
    }
}

async fn me(headers: HeaderMap) -> StatusCode {
    if authorized(&headers) {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn gallery(headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token expired"})));
    }
    (
        StatusCode::OK,
        Json(json!({"videos": [{
            "id": "drive-1",
            "name": "first.mp4",
            "thumbnailUrl": "https://thumbs.example/1",
            "downloadUrl": "https://files.example/1",
            "createdAt": "2026-10-01T10:00:00Z",
            "sizeBytes": "2048",
            "mimeType": "video/mp4",
            "isPosted": false
        }, {
            "id": "drive-2",
            "name": "still-uploading.mp4"
        }]})),
    )
}

async fn video_request(Json(body): Json<Value>) -> impl IntoResponse {
    if body["num_images"] == 0 {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "At least one image is required"})),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({"request": {"id": 99, "metodo": body["metodo"], "frase": body["frase"], "num_images": body["num_images"], "status": "pending"}})),
    )
}

async fn trigger(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.bodies.lock().expect("lock").push(body);
    StatusCode::ACCEPTED
}

async fn highlights(Json(body): Json<Value>) -> Json<Value> {
    if body["url"] == "https://youtu.be/ok" {
        Json(json!({"highlights": ["/clips/1.mp4", "/clips/2.mp4"]}))
    } else {
        Json(json!({"error": "Video unavailable"}))
    }
}

async fn spawn_server(received: Received) -> String {
    let router = Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/api/gallery", get(gallery))
        .route("/api/video-request", post(video_request))
        .route("/api/trigger-n8n", post(trigger))
        .route("/api/youtube-highlights", post(highlights))
        .with_state(received);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });
    format!("http://{addr}")
}

fn backend(base_url: &str, signal: UnauthorizedSignal) -> HttpBackend {
    HttpBackend::new(BackendConfig::new(base_url, Duration::from_secs(5)), signal)
        .expect("Failed to build backend")
}

#[tokio::test]
async fn test_login_success_and_rejection() {
    let base_url = spawn_server(Received::default()).await;
    let signal = UnauthorizedSignal::new();
    let mut rx = signal.subscribe();
    let backend = backend(&base_url, signal);

    let response = backend
        .login(&LoginRequest {
            email: "ana@example.com".to_string(),
            password: "correct horse".to_string(),
        })
        .await
        .expect("login should succeed");
    assert_eq!(response.token, TOKEN);
    assert_eq!(response.user.id, "7");
    assert_eq!(response.user.name, "ana");

    let err = backend
        .login(&LoginRequest {
            email: "ana@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .expect_err("login should fail");
    assert_eq!(
        err,
        ApiError::Unauthorized(Some("Invalid credentials".to_string()))
    );

    // A failed login is not a revoked session
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_validate_token() {
    let base_url = spawn_server(Received::default()).await;
    let backend = backend(&base_url, UnauthorizedSignal::new());

    tokio_test::assert_ok!(backend.validate_token(TOKEN).await);
    assert!(
        backend
            .validate_token("revoked")
            .await
            .expect_err("revoked token")
            .is_unauthorized()
    );
}

#[tokio::test]
async fn test_gallery_forwards_bearer_and_raises_signal_on_rejection() {
    let base_url = spawn_server(Received::default()).await;
    let signal = UnauthorizedSignal::new();
    let mut rx = signal.subscribe();
    let backend = backend(&base_url, signal);

    // drive-2 has no creation time and is dropped
    let videos = backend.list_gallery(TOKEN).await.expect("gallery");
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id, "drive-1");
    assert_eq!(videos[0].size_bytes, 2048);
    assert!(!videos[0].is_posted);
    assert!(rx.try_recv().is_err());

    let err = backend.list_gallery("expired").await.expect_err("rejected");
    assert_eq!(err.detail(), Some("Token expired"));
    tokio_test::assert_ok!(rx.try_recv());
}

#[tokio::test]
async fn test_video_request_and_server_detail() {
    let base_url = spawn_server(Received::default()).await;
    let backend = backend(&base_url, UnauthorizedSignal::new());

    let created = backend
        .create_video_request(
            TOKEN,
            &CreateVideoRequest {
                metodo: VideoMethod::Manual,
                frase: Some("sunset over the sea".to_string()),
                num_images: 2,
            },
        )
        .await
        .expect("request created");
    assert_eq!(created.id, "99");
    assert_eq!(created.method, Some(VideoMethod::Manual));
    assert_eq!(created.image_count, Some(2));

    let err = backend
        .create_video_request(
            TOKEN,
            &CreateVideoRequest {
                metodo: VideoMethod::Automatic,
                frase: None,
                num_images: 0,
            },
        )
        .await
        .expect_err("rejected");
    assert_eq!(
        err,
        ApiError::Server {
            status: 422,
            detail: Some("At least one image is required".to_string())
        }
    );
}

#[tokio::test]
async fn test_trigger_payload_shape() {
    let received = Received::default();
    let base_url = spawn_server(received.clone()).await;
    let backend = backend(&base_url, UnauthorizedSignal::new());

    backend
        .trigger_generation(
            TOKEN,
            &TriggerRequest {
                request_id: "99".to_string(),
                user: "7".to_string(),
                metodo: VideoMethod::Automatic,
                frase: None,
                images: vec!["aGVsbG8=".to_string()],
            },
        )
        .await
        .expect("trigger accepted");

    let bodies = received.bodies.lock().expect("lock").clone();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["request_id"], "99");
    assert_eq!(bodies[0]["metodo"], "Automatico");
    assert_eq!(bodies[0]["images"][0], "aGVsbG8=");
    assert!(bodies[0].get("frase").is_none());
}

#[tokio::test]
async fn test_highlights() {
    let base_url = spawn_server(Received::default()).await;
    let backend = backend(&base_url, UnauthorizedSignal::new());

    let clips = backend
        .youtube_highlights(TOKEN, "https://youtu.be/ok")
        .await
        .expect("highlights");
    assert_eq!(clips, vec!["/clips/1.mp4", "/clips/2.mp4"]);

    let err = backend
        .youtube_highlights(TOKEN, "https://youtu.be/missing")
        .await
        .expect_err("error body");
    assert_eq!(err.detail(), Some("Video unavailable"));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let backend = backend(&format!("http://{addr}"), UnauthorizedSignal::new());
    let err = backend.validate_token(TOKEN).await.expect_err("unreachable");
    assert!(err.is_network(), "unexpected error: {err:?}");
}
