//! Public types for the events API
use serde::{Deserialize, Serialize};

use crate::ai::EventFields;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub calendar_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Minutes
    pub duration: i64,
    /// UTC, `YYYY-MM-DDTHH:MM:SSZ`
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
}

impl Event {
    pub fn is_recurring(&self) -> bool {
        self.recurrence_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub calendar_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration: i64,
    pub date: String,
    #[serde(default)]
    pub recurring: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration: i64,
    pub date: String,
}

/// `?recurring=true` widens an update or delete to the rest of the
/// series.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub recurring: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateEventRequest {
    pub content: String,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Extracted fields, shaped so they can be posted back to
/// `POST /events` as is.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedEvent {
    #[serde(flatten)]
    pub fields: EventFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub recipients: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cancelled: bool,
}
