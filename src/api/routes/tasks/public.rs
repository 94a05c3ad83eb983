//! Public types for the tasks API
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub calendar_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    /// Minutes
    pub duration: i64,
    pub deadline: String,
    pub difficulty: i64,
    pub priority: i64,
    pub completed: bool,
}

/// Body for both creating and replacing a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[serde(default)]
    pub calendar_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: i64,
    pub deadline: String,
    #[serde(default)]
    pub difficulty: i64,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub completed: bool,
}
