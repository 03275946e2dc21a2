#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use todoism_api::config::Config;
use todoism_api::{AppState, AppStateInner};
use todoism_db::Database;

pub const PUBLIC_URL: &str = "http://todoism.test";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config {
            public_url: PUBLIC_URL.into(),
            secret_key: "integration-secret".into(),
            ..Config::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let db = Database::open_in_memory().expect("in-memory database");
        let state = AppStateInner::new(db, config);
        let router = todoism_api::router(state.clone());
        Self { state, router }
    }

    /// Creates a user straight in the database and returns its id and a
    /// fresh token. The stored hash is not a real one, so these users cannot
    /// log in through `/oauth/token`.
    pub fn user(&self, username: &str) -> (i64, String) {
        let id = self
            .state
            .db
            .create_user(username, "not-a-real-hash", None)
            .expect("create user");
        let token = self.state.tokens.issue(id).expect("issue token").token;
        (id, token)
    }

    pub fn item(&self, author_id: i64, body: &str, done: bool) -> i64 {
        let item = self.state.db.create_item(author_id, body).expect("create item");
        if done {
            self.state.db.toggle_item(item.id).expect("toggle item");
        }
        item.id
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        json: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match json {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("request")).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn form(&self, uri: &str, form: &str) -> TestResponse {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("request");
        self.send(req).await
    }

    pub async fn with_auth_header(&self, method: Method, uri: &str, value: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        self.send(builder.body(Body::empty()).expect("request")).await
    }
}

pub fn url(path: &str) -> String {
    format!("{}{}", PUBLIC_URL, path)
}
