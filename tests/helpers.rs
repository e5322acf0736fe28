//! Integration test helpers
//!
//! Spawns the full application on a random port and talks to it over HTTP,
//! so tests exercise routing, extractors and error mapping end to end.

use planfloor::{create_app, AppState, WebConfig};
use serde_json::{json, Value};
use std::sync::LazyLock;
use tempfile::TempDir;
use tokio::net::TcpListener;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "planfloor-integration-test-secret";

static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// A running application instance plus the client pointed at it
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    // Holds the database file and upload dir for the app's lifetime
    _workdir: TempDir,
}

/// Spawn an app backed by a fresh SQLite file
pub async fn spawn_app() -> TestApp {
    spawn_app_with(true, false).await
}

/// Spawn an app with explicit database/demo-mode configuration
pub async fn spawn_app_with(with_database: bool, demo_mode: bool) -> TestApp {
    LazyLock::force(&TRACING);

    let workdir = tempfile::tempdir().expect("Failed to create test workdir");
    let database_url = with_database
        .then(|| format!("sqlite:{}", workdir.path().join("planfloor.db").display()));

    let config = WebConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        dev_mode: true,
        demo_mode,
        database_url,
        upload_dir: workdir.path().join("uploads").display().to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
    };

    let state = AppState::new(config).await.expect("Failed to build app state");
    let app = create_app(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        api_client,
        _workdir: workdir,
    }
}

impl TestApp {
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_with_auth(&self, path: &str, token: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json<Body: serde::Serialize>(
        &self,
        path: &str,
        body: &Body,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_with_auth<Body: serde::Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &Body,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_with_auth<Body: serde::Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &Body,
    ) -> reqwest::Response {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete_with_auth(&self, path: &str, token: &str) -> reqwest::Response {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_multipart_with_auth(
        &self,
        path: &str,
        token: &str,
        form: reqwest::multipart::Form,
    ) -> reqwest::Response {
        self.api_client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register a fresh user and return it with its access token
    pub async fn register_user(&self) -> (TestUser, String) {
        let user = TestUser::generate();
        let response = self.post_json("/api/auth/register", &user.to_register_json()).await;
        assert_eq!(response.status().as_u16(), 201, "registration should succeed");

        let body: Value = response.json().await.unwrap();
        let token = body["access_token"].as_str().unwrap().to_string();
        (user, token)
    }

    /// Log in as the seeded default admin account
    pub async fn admin_token(&self) -> String {
        let response = self
            .post_json(
                "/api/auth/login",
                &json!({
                    "email": "admin@planfloor.local",
                    "password": "admin123"
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200, "admin login should succeed");

        let body: Value = response.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Create a project for the given token and return its id
    pub async fn create_project(&self, token: &str, name: &str) -> String {
        let response = self
            .post_with_auth(
                "/api/projects",
                token,
                &json!({
                    "name": name,
                    "total_area": 85.5,
                    "project_type": "residential",
                    "main_material": "Oak parquet"
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201, "project creation should succeed");

        let body: Value = response.json().await.unwrap();
        body["project"]["id"].as_str().unwrap().to_string()
    }
}

/// Randomized account data for registration tests
pub struct TestUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl TestUser {
    pub fn generate() -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            name: format!("Test User {}", &id[..8]),
            email: format!("test_{}@example.com", &id[..8]),
            password: "test_password_123".to_string(),
        }
    }

    pub fn to_register_json(&self) -> Value {
        json!({
            "name": self.name,
            "email": self.email,
            "password": self.password,
        })
    }

    pub fn to_login_json(&self) -> Value {
        json!({
            "email": self.email,
            "password": self.password,
        })
    }
}
