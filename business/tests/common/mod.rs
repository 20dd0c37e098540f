//! Shared fixtures for the mock-server tests.

#![allow(dead_code)]

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use roster_business::{ApiClient, AuthSession, BusinessConfig, Resource, ResourceController};
use serde::Serialize;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A mock API server plus a signed-in client pointed at it.
pub struct TestContext {
    pub mock_server: MockServer,
    pub auth: AuthSession,
    pub client: ApiClient,
}

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    role: &'a str,
    exp: i64,
}

pub fn token_for(sub: &str, role: &str) -> String {
    encode(
        &Header::default(),
        &Claims {
            sub,
            role,
            exp: Utc::now().timestamp() + 3600,
        },
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .expect("token encodes")
}

impl TestContext {
    pub async fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let mock_server = MockServer::start().await;
        let auth = AuthSession::with_token(&token_for("admin", "admin")).expect("valid token");
        let client = ApiClient::new(BusinessConfig::new(mock_server.uri()), auth.clone());

        Self {
            mock_server,
            auth,
            client,
        }
    }

    /// Mounts `GET /api/{resource}` answering with one page of `items`.
    pub async fn mock_list(&self, resource: &str, items: Vec<Value>, total: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/api/{resource}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(items, total)))
            .mount(&self.mock_server)
            .await;
    }
}

pub fn page_body(items: Vec<Value>, total: u64) -> Value {
    let pages = total.div_ceil(10);
    json!({"items": items, "total": total, "page": 1, "size": 10, "pages": pages})
}

/// Drives `controller` until it has nothing in flight.
pub async fn settle<T: Resource>(controller: &mut ResourceController<T>) {
    tokio::time::timeout(Duration::from_secs(5), controller.settle())
        .await
        .expect("controller settled in time");
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "is_active": true,
        "role_id": 2,
        "role_name": "manager",
        "worker_id": null,
        "worker_name": null
    })
}
