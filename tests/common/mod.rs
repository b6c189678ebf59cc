#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use moodlog::db::{Database, DbConfig};
use serde_json::{json, Value};
use sqlx::SqlitePool;

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    pub async fn new() -> Self {
        // One connection: every in-memory SQLite connection is its own database.
        let db = Database::new(DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        });
        let router = moodlog::build_app(db.clone(), false);

        Self { router, db }
    }

    pub async fn pool(&self) -> &SqlitePool {
        self.db.connect().await.expect("Failed to open in-memory database")
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Send a GET request with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a JSON body with the given method.
    pub async fn send_json(&self, method: &str, uri: &str, body: &Value, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Response {
        self.send_json("POST", uri, body, None).await
    }

    pub async fn patch_json(&self, uri: &str, body: &Value) -> Response {
        self.send_json("PATCH", uri, body, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, uri: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    /// Sign up through the API and return the new user's id.
    pub async fn create_user(&self, username: &str, password: &str) -> String {
        let resp = self
            .post_json("/api/users", &json!({ "username": username, "password": password }))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        body["data"]["_id"].as_str().unwrap().to_string()
    }

    /// Log in and return the session cookie string.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let resp = self
            .post_json("/api/auth/login", &json!({ "username": username, "password": password }))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        resp.headers()
            .get("set-cookie")
            .expect("Login should set a session cookie")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    /// Create an entry through the API and return its JSON record.
    pub async fn create_entry(&self, body: Value) -> Value {
        let resp = self.post_json("/api/entries", &body).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["data"].clone()
    }

    /// Create a task through the API and return its JSON record.
    pub async fn create_task(&self, body: Value) -> Value {
        let resp = self.post_json("/api/tasks", &body).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["data"].clone()
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

/// Assert a failed envelope with the given status and message.
pub async fn assert_error(resp: Response, status: StatusCode, message: &str) {
    assert_eq!(resp.status(), status);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], message);
    assert!(body.get("data").is_none());
}
