#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use logboard::auth::jwt::{self, Claims};
use logboard::config::Config;
use logboard::models::{LogRecord, UserProfile};
use logboard::store::MemoryLogStore;

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

/// A running test server backed by an in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<MemoryLogStore>,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Token for an operator with dashboard access.
    pub fn admin_token(&self) -> String {
        token(true)
    }

    /// Token for a signed-in user without dashboard access.
    pub fn user_token(&self) -> String {
        token(false)
    }

    /// Make an authenticated GET request and parse the JSON body.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated GET request and return the raw response.
    pub async fn get_raw(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed")
    }

    pub async fn add_profile(&self, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.store
            .insert_profile(UserProfile {
                id,
                name: name.to_string(),
            })
            .await;
        id
    }

    /// Insert a log `minutes` after the fixed base time.
    pub async fn add_log(
        &self,
        action: &str,
        minutes: i64,
        user: Option<Uuid>,
        metadata: Value,
    ) -> LogRecord {
        let record = LogRecord {
            id: Uuid::now_v7(),
            user_action: action.to_string(),
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)".to_string()),
            ip_address: Some("203.0.113.7".to_string()),
            authenticated_id: user,
            metadata,
            created_at: at(minutes),
            user_name: None,
        };
        self.store.insert_log(record.clone()).await;
        record
    }

    /// `login` logs first, then `other` logs named `page_load`.
    pub async fn seed(&self, login: usize, other: usize) {
        for i in 0..login {
            self.add_log("login", i as i64, None, json!({})).await;
        }
        for i in 0..other {
            self.add_log("page_load", (login + i) as i64, None, json!({ "page": "/" }))
                .await;
        }
    }
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn token(admin: bool) -> String {
    let claims = Claims::new(Uuid::now_v7(), "Test Operator".to_string(), admin, Duration::minutes(15));
    jwt::encode_token(&claims, JWT_SECRET).unwrap()
}

pub fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        login_url: "https://id.example.com/login".to_string(),
        run_migrations: false,
        log_level: "warn".to_string(),
    }
}

/// Spawn a test app over an empty in-memory store.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryLogStore::new());
    let app = logboard::build_app(store.clone(), test_config("memory://"));

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { addr, store, client }
}

/// A throwaway Postgres database with migrations applied.
pub struct TestDb {
    pub pool: PgPool,
    pub db_name: String,
    admin_url: String,
}

fn admin_url() -> String {
    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or(base_url)
}

pub async fn create_test_db() -> TestDb {
    let _ = dotenvy::dotenv();

    let db_name = format!("logboard_test_{}", Uuid::now_v7().simple());
    let admin_url = admin_url();

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = admin_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| admin_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    TestDb {
        pool,
        db_name,
        admin_url,
    }
}

/// Drop the test database after tests complete.
pub async fn drop_test_db(db: TestDb) {
    db.pool.close().await;

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&db.admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!(
        "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
        db.db_name
    ))
    .execute(&admin_pool)
    .await;

    admin_pool.close().await;
}
