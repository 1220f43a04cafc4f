//! Liveness endpoint behavior.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use studygate_store::{rate_limit_key, KvStore};

use common::{body_json, TestApp};

#[tokio::test]
async fn health_reports_uptime_and_tracked_identities() {
    let app = TestApp::spawn().await;
    app.store
        .put(&rate_limit_key("user:student-7"), "{\"requests\":[]}", None)
        .await
        .expect("seed record");
    app.store
        .put(&rate_limit_key("ip:10.0.0.9"), "{\"requests\":[]}", None)
        .await
        .expect("seed record");

    let response = app
        .send(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rate_limit_keys"], 2);
    assert!(body["uptime_secs"].as_u64().is_some());
}
