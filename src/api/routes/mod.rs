//! API routes module

pub mod calendars;
pub mod events;
pub mod tasks;
pub mod users;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Calendar and membership routes
        .nest("/calendars", calendars::router())
        // Event routes, including recurring series
        .nest("/events", events::router())
        // Task routes
        .nest("/tasks", tasks::router())
        // Identity directory
        .nest("/users", users::router())
}
