//! Shared fixtures for the router tests.
//!
//! Each [`TestApp`] owns a temporary server root with the standard
//! directory layout and a router built through the real bootstrap path.
//! The supervisor socket never exists, so the daemon always reads as down.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use terractl_axum::{AppConfig, bootstrap, create_router, create_spa_router};

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "hunter2-hunter2";
pub const ACTIVE_WORLD: &str = "Alpha";

/// Pattern nothing on a test machine will be running.
pub const NO_SUCH_PROCESS: &str = "terractl-test-no-such-process-5f1c";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct TestApp {
    pub tmp: TempDir,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Router that also serves `<root>/web` as a single-page app.
    pub fn with_frontend(index_html: &str) -> Self {
        Self::build(Some(index_html))
    }

    fn build(index_html: Option<&str>) -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        for dir in ["worlds", "backups", "logs", "scripts", "config"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }

        let config = test_config(&root);
        let ctx = bootstrap(&config).unwrap();
        let router = match index_html {
            Some(html) => {
                let web = root.join("web");
                fs::create_dir_all(&web).unwrap();
                fs::write(web.join("index.html"), html).unwrap();
                create_spa_router(ctx, web, &config.server.cors)
            }
            None => create_router(ctx, &config.server.cors),
        };

        Self { tmp, router }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn world(&self, name: &str) -> PathBuf {
        let path = self.path(&format!("worlds/{name}.wld"));
        fs::write(&path, vec![0u8; 2048]).unwrap();
        path
    }

    pub fn backup(&self, filename: &str) -> PathBuf {
        let path = self.path(&format!("backups/{filename}"));
        fs::write(&path, b"archive").unwrap();
        path
    }

    pub fn log(&self, filename: &str, lines: usize) -> PathBuf {
        let path = self.path(&format!("logs/{filename}"));
        let content: String = (1..=lines).map(|i| format!("line {i}\n")).collect();
        fs::write(&path, content).unwrap();
        path
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Option<Value>) -> TestResponse {
        self.send(Method::POST, uri, Some(token), body).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Log in with the test credentials and return the token.
    pub async fn login(&self) -> String {
        let res = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({
                    "username": TEST_USERNAME,
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.text());
        res.json()["token"].as_str().unwrap().to_string()
    }
}

fn test_config(root: &Path) -> AppConfig {
    let root = root.to_string_lossy().into_owned();
    let socket = format!("{root}/supervisor.sock");
    AppConfig::from_lookup(move |key| match key {
        "TERRARIA_DIR" => Some(root.clone()),
        "SUPERVISOR_SOCKET" => Some(socket.clone()),
        "SERVER_PROCESS_PATTERN" => Some(NO_SUCH_PROCESS.to_string()),
        "API_USERNAME" => Some(TEST_USERNAME.to_string()),
        "API_PASSWORD" => Some(TEST_PASSWORD.to_string()),
        "WORLD_NAME" => Some(ACTIVE_WORLD.to_string()),
        "BACKUP_ENABLED" => Some("false".to_string()),
        _ => None,
    })
}
