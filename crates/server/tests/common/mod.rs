#![allow(dead_code)]

//! Shared harness for the HTTP surface tests: mock backends, an in-memory
//! KV store, and a router wired exactly like production.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use axum::Router;
use serde_json::json;
use studygate_auth::{issue_session, SessionClaims, TokenType};
use studygate_core::config::RateLimitSettings;
use studygate_core::time::unix_now;
use studygate_core::Config;
use studygate_server::{router, AppState};
use studygate_store::MemoryStore;
use tower::ServiceExt;
use wiremock::MockServer;

pub const SECRET: &str = "test-signing-secret";

pub struct TestApp {
    pub metadata: MockServer,
    pub storage: MockServer,
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a config tweak applied before the state is built.
    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> Self {
        let metadata = MockServer::start().await;
        let storage = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());

        let mut config = Config {
            port: 0,
            signing_secret: SECRET.to_string(),
            metadata_url: metadata.uri(),
            metadata_key: "svc-key".to_string(),
            storage_url: storage.uri(),
            storage_key: "svc-key".to_string(),
            storage_bucket: "resources".to_string(),
            redis_url: None,
            trusted_ip_header: "x-real-ip".to_string(),
            rate_limit: RateLimitSettings::default(),
        };
        configure(&mut config);

        let state = AppState::from_parts(config, store.clone());
        Self {
            metadata,
            storage,
            store,
            router: router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }
}

/// A signed access session, the credential a logged-in browser carries.
pub fn access_jwt(subject: &str) -> String {
    signed_session(subject, TokenType::Access)
}

/// A refresh-type session; valid signature, wrong credential class.
pub fn refresh_jwt(subject: &str) -> String {
    signed_session(subject, TokenType::Refresh)
}

fn signed_session(subject: &str, token_type: TokenType) -> String {
    let now = unix_now();
    issue_session(
        &SessionClaims {
            sub: subject.to_string(),
            token_type,
            profile: None,
            iat: now,
            exp: now + 3600,
        },
        SECRET,
    )
    .expect("session should sign")
}

/// One metadata row as the backend serves it.
pub fn resource_json(id: &str, filename: &str, updated_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "filename": filename,
        "title": filename,
        "storage_key": format!("sem1/math/unit1/{filename}"),
        "content_type": "application/pdf",
        "course": "bsc-cs",
        "semester": "sem1",
        "subject": "math",
        "unit": "unit1",
        "type": "notes",
        "updated_at": updated_at,
    })
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable")
        .to_vec()
}
