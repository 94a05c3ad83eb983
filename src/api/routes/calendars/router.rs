//! Router for the calendars API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use super::db as calendars_db;
use super::public;
use crate::api::public::{ApiError, JsonBody};
use crate::api::state::SharedState;
use crate::core::Error;
use crate::identity::Session;

fn require_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::BadRequest(String::from("Calendar name is required")));
    }
    Ok(())
}

// List the caller's calendars
async fn list_calendars(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Vec<public::Calendar>>, ApiError> {
    let calendars = calendars_db::list_calendars(&state.db, session.user_id().to_string()).await?;
    Ok(Json(calendars))
}

async fn create_calendar(
    State(state): State<SharedState>,
    session: Session,
    JsonBody(request): JsonBody<public::CreateCalendarRequest>,
) -> Result<Json<public::Calendar>, ApiError> {
    require_name(&request.name)?;
    let calendar =
        calendars_db::create_calendar(&state.db, session.user_id().to_string(), request).await?;
    tracing::info!("Created calendar {}", calendar.id);
    Ok(Json(calendar))
}

async fn update_calendar(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<public::UpdateCalendarRequest>,
) -> Result<Json<public::Calendar>, ApiError> {
    require_name(&request.name)?;
    let calendar =
        calendars_db::update_calendar(&state.db, session.user_id().to_string(), id, request)
            .await?;
    Ok(Json(calendar))
}

async fn delete_calendar(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<(), ApiError> {
    calendars_db::delete_calendar(&state.db, session.user_id().to_string(), id.clone()).await?;
    tracing::info!("Deleted calendar {}", id);
    Ok(())
}

async fn add_member(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<public::AddMemberRequest>,
) -> Result<Json<public::Calendar>, ApiError> {
    if request.user_id.trim().is_empty() {
        return Err(Error::BadRequest(String::from("userId is required")).into());
    }
    let calendar = calendars_db::add_member(
        &state.db,
        session.user_id().to_string(),
        id,
        request.user_id,
    )
    .await?;
    Ok(Json(calendar))
}

// Removing a member is a no-op unless the caller belongs to the calendar
async fn remove_member(
    State(state): State<SharedState>,
    session: Session,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<(), ApiError> {
    let removed = calendars_db::remove_member(
        &state.db,
        session.user_id().to_string(),
        id.clone(),
        user_id,
    )
    .await?;
    tracing::debug!("Removed {} member(s) from calendar {}", removed, id);
    Ok(())
}

/// Create the calendars router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_calendars).post(create_calendar))
        .route("/{id}", put(update_calendar).delete(delete_calendar))
        .route("/{id}/members", post(add_member))
        .route(
            "/{id}/members/{user_id}",
            axum::routing::delete(remove_member),
        )
}
