//! Public types for the calendars API
use serde::{Deserialize, Serialize};

/// Color assigned to every default calendar at creation.
pub const DEFAULT_CALENDAR_COLOR: &str = "#93c4fd";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_default: bool,
    pub members: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarRequest {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCalendarRequest {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
}
