//! Common test utilities for API integration tests
//!
//! Requires PostgreSQL at `DATABASE_URL`; without it [`TestContext::new`]
//! returns `None` and the test returns early.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Duration;
use projectdesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use projectdesk_shared::{
    auth::jwt::{create_token, Claims},
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{create_pool, DatabaseConfig},
    },
    models::user::{CreateUser, User},
};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context with router and database
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Builds the router against the test database
    pub async fn new() -> Option<Self> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping API test");
            return None;
        };

        ensure_database_exists(&database_url)
            .await
            .expect("Failed to ensure test database exists");

        let db = create_pool(DatabaseConfig {
            url: database_url.clone(),
            max_connections: 5,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("Failed to connect to test database");

        run_migrations(&db).await.expect("Failed to run migrations");

        let vars: HashMap<&str, String> = [
            ("DATABASE_URL", database_url),
            ("JWT_SECRET", TEST_SECRET.to_string()),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).cloned())
            .expect("Failed to build test config");

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Some(Self { db, app, config })
    }

    /// Creates a user and returns it with a valid bearer token
    pub async fn user(&self, prefix: &str) -> (User, String) {
        let user = User::create(
            &self.db,
            CreateUser {
                username: format!("{}-{}", prefix, Uuid::new_v4()),
                is_staff: false,
            },
        )
        .await
        .expect("Failed to create test user");

        let claims = Claims::new(user.id, &self.config.jwt.issuer, Duration::hours(1));
        let token = create_token(&claims, &self.config.jwt.secret).expect("Failed to sign token");

        (user, token)
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Body is not JSON")
        };

        (status, json)
    }
}
