//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use encore_server::{create_router, services::AuthService, state::AppState};
use encore_storage::{MembershipContext, OrderingConfig};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key";

/// Router over a fresh SQLite file, plus the handles tests need to seed it
pub struct TestApp {
    pub router: Router,
    pub membership: Arc<MembershipContext>,
    pub auth_service: Arc<AuthService>,
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_lock_timeout(Duration::from_secs(5)).await
    }

    pub async fn with_lock_timeout(lock_timeout: Duration) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

        let pool = encore_storage::create_pool(&db_url).await.unwrap();
        encore_storage::run_migrations(&pool).await.unwrap();

        let membership = Arc::new(MembershipContext::new(
            pool.clone(),
            OrderingConfig { lock_timeout },
        ));
        let auth_service = Arc::new(AuthService::new(TEST_SECRET.to_string(), 1));
        let router = create_router(AppState::new(
            Arc::clone(&membership),
            Arc::clone(&auth_service),
        ));

        Self {
            router,
            membership,
            auth_service,
            pool,
            _temp_dir: temp_dir,
        }
    }

    pub fn token_for(&self, user_id: i64) -> String {
        self.auth_service.create_access_token(user_id).unwrap()
    }

    /// Send a request as `user_id`, returning the status and parsed JSON body
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        user_id: Option<i64>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token_for(user_id)),
            );
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

/// Test fixtures inserted straight into the catalog tables
pub mod fixtures {
    use sqlx::SqlitePool;

    pub async fn user(pool: &SqlitePool, username: &str) -> i64 {
        sqlx::query("INSERT INTO users (username) VALUES (?)")
            .bind(username)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn creator(pool: &SqlitePool, user_id: i64, name: &str) -> i64 {
        sqlx::query("INSERT INTO creators (user_id, display_name) VALUES (?, ?)")
            .bind(user_id)
            .bind(name)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn song(pool: &SqlitePool, title: &str, creator_id: Option<i64>) -> i64 {
        sqlx::query("INSERT INTO songs (title, creator_id) VALUES (?, ?)")
            .bind(title)
            .bind(creator_id)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn podcast(pool: &SqlitePool, title: &str) -> i64 {
        sqlx::query("INSERT INTO podcasts (title) VALUES (?)")
            .bind(title)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn playlist(pool: &SqlitePool, name: &str, owner_id: i64) -> i64 {
        sqlx::query(
            "INSERT INTO playlists (owner_id, name, is_public, is_collaborative) \
             VALUES (?, ?, 0, 0)",
        )
        .bind(owner_id)
        .bind(name)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn album(pool: &SqlitePool, name: &str, creator_id: i64) -> i64 {
        sqlx::query("INSERT INTO albums (creator_id, name, is_published) VALUES (?, ?, 1)")
            .bind(creator_id)
            .bind(name)
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }
}
