//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agenda::ai::{EventExtractor, EventFields};
use agenda::api::{AppState, app};
use agenda::core::db::{async_db, initialize_db};
use agenda::core::{AppConfig, Result};
use agenda::identity::{FixtureIdentityProvider, IdentityProvider, KratosIdentityProvider};
use agenda::notify::Mailer;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Utc};
use lettre::Message;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tokio_rusqlite::Connection;
use tower::util::ServiceExt;

pub const USER_ID: &str = "0b7f5c2e-4c1a-4f4e-9d55-1c8a6f0e2a11";
pub const OTHER_USER_ID: &str = "9e3d1b6a-7f28-4a0c-b1d4-52e8c7a9f033";

/// Extractor that answers every request with the same fields.
pub struct FixedExtractor {
    pub fields: EventFields,
}

impl Default for FixedExtractor {
    fn default() -> Self {
        Self {
            fields: EventFields {
                title: String::from("Dinner with Alex"),
                description: String::new(),
                duration: 90,
                date: String::from("2024-11-01T23:00:00Z"),
                recurring: false,
            },
        }
    }
}

#[async_trait]
impl EventExtractor for FixedExtractor {
    async fn extract(&self, _text: &str, _reference_time: DateTime<Utc>) -> Result<EventFields> {
        Ok(self.fields.clone())
    }
}

/// Mailer that hands every message to the test instead of a server.
pub struct RecordingMailer {
    sender: mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: Message) -> Result<()> {
        let _ = self.sender.send(message);
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| {
        let value = match key {
            "DATABASE_URL" => ":memory:",
            "MAIL_PASSWORD" => "test-password",
            "MAIL_FROM" => "calendar@example.com",
            "INVITE_DOMAIN" => "example.com",
            "ENVIRONMENT" => "development",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

/// One in-memory database shared by routers acting as different
/// users.
pub struct TestApp {
    pub db: Connection,
    mailer: Arc<RecordingMailer>,
    outbox: Mutex<mpsc::UnboundedReceiver<Message>>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = async_db(":memory:")
            .await
            .expect("Failed to connect to async db");
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await
        .expect("Failed to migrate db");

        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            db,
            mailer: Arc::new(RecordingMailer { sender }),
            outbox: Mutex::new(receiver),
        }
    }

    fn router_with(&self, identity: Arc<dyn IdentityProvider>) -> Router {
        let state = AppState::new(
            self.db.clone(),
            test_config(),
            identity,
            Arc::new(FixedExtractor::default()),
            self.mailer.clone(),
        );
        app(Arc::new(state))
    }

    /// Router whose every request is authenticated as `user_id`.
    pub fn as_user(&self, user_id: &str) -> Router {
        self.router_with(Arc::new(FixtureIdentityProvider::for_user(user_id)))
    }

    /// Router backed by a real identity provider that is never
    /// reached, so requests without a session cookie are anonymous.
    pub fn anonymous(&self) -> Router {
        self.router_with(Arc::new(KratosIdentityProvider::new(
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        )))
    }

    /// Wait for the next invite handed to the mailer.
    pub async fn next_mail(&self) -> Option<Message> {
        let mut outbox = self.outbox.lock().await;
        tokio::time::timeout(Duration::from_secs(5), outbox.recv())
            .await
            .ok()
            .flatten()
    }

    /// Rows in the events table, ordered by date.
    pub async fn stored_events(&self) -> Vec<(String, String, String, Option<String>)> {
        self.db
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, date, recurrence_id FROM events ORDER BY date, id",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                    })?
                    .collect::<rusqlite::Result<Vec<(String, String, String, Option<String>)>>>()?;
                Ok(rows)
            })
            .await
            .unwrap()
    }
}

/// Creates a test application router authenticated as [`USER_ID`].
pub async fn test_app() -> Router {
    TestApp::new().await.as_user(USER_ID)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Send a request with an optional JSON body and return the status and
/// the decoded body (`Value::Null` when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let text = body_to_string(response.into_body()).await;
    let value = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (status, value)
}

/// Create a calendar as the user behind `app` and return its id.
pub async fn create_calendar(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/calendars",
        Some(serde_json::json!({ "name": name, "color": "#ff0000" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}
