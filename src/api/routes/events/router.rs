//! Router for the events API

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::Utc;
use http::StatusCode;

use super::db as events_db;
use super::public;
use crate::api::public::{ApiError, JsonBody, QueryParams};
use crate::api::state::SharedState;
use crate::core::Error;
use crate::core::time::{MAX_DURATION_MINUTES, parse_timestamp};
use crate::identity::Session;
use crate::notify::{Invite, compose_invite, send_invite};
use crate::recurrence::Scope;

fn validate_fields(title: &str, duration: i64) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::BadRequest(String::from("Event title is required")));
    }
    if duration < 0 {
        return Err(Error::BadRequest(String::from(
            "Event duration must not be negative",
        )));
    }
    if duration > MAX_DURATION_MINUTES {
        return Err(Error::BadRequest(format!(
            "Event duration must not exceed {} minutes",
            MAX_DURATION_MINUTES
        )));
    }
    Ok(())
}

// List events across the caller's calendars
async fn list_events(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Vec<public::Event>>, ApiError> {
    let events = events_db::list_events(&state.db, session.user_id().to_string()).await?;
    Ok(Json(events))
}

async fn get_event(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<public::Event>, ApiError> {
    let event = events_db::get_event(&state.db, session.user_id().to_string(), id).await?;
    Ok(Json(event))
}

// Create a one-off event or a weekly series. Only the first
// occurrence is returned.
async fn create_event(
    State(state): State<SharedState>,
    session: Session,
    JsonBody(request): JsonBody<public::CreateEventRequest>,
) -> Result<Json<public::Event>, ApiError> {
    validate_fields(&request.title, request.duration)?;
    let anchor = parse_timestamp(&request.date)?;
    let recurring = request.recurring;

    let event =
        events_db::create_event(&state.db, session.user_id().to_string(), request, anchor).await?;
    tracing::info!(
        "Created event {} (recurring: {}) in calendar {}",
        event.id,
        recurring,
        event.calendar_id
    );
    Ok(Json(event))
}

// Extract event fields from free text without persisting anything
async fn generate_event(
    State(state): State<SharedState>,
    _session: Session,
    JsonBody(request): JsonBody<public::GenerateEventRequest>,
) -> Result<Json<public::GeneratedEvent>, ApiError> {
    if request.content.trim().is_empty() {
        return Err(Error::BadRequest(String::from("Content is required")).into());
    }

    let fields = state.extractor.extract(&request.content, Utc::now()).await?;
    Ok(Json(public::GeneratedEvent {
        fields,
        calendar_id: request.calendar_id,
    }))
}

async fn update_event(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<public::ScopeQuery>,
    JsonBody(patch): JsonBody<public::UpdateEventRequest>,
) -> Result<Json<public::Event>, ApiError> {
    validate_fields(&patch.title, patch.duration)?;
    let requested = parse_timestamp(&patch.date)?;
    let scope = Scope::from_flag(query.recurring.as_deref());

    let event = events_db::update_event(
        &state.db,
        session.user_id().to_string(),
        id,
        patch,
        requested,
        scope,
    )
    .await?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    QueryParams(query): QueryParams<public::ScopeQuery>,
) -> Result<(), ApiError> {
    let scope = Scope::from_flag(query.recurring.as_deref());
    let deleted =
        events_db::delete_event(&state.db, session.user_id().to_string(), id.clone(), scope)
            .await?;
    tracing::info!("Deleted {} occurrence(s) starting at event {}", deleted, id);
    Ok(())
}

// Email an invite for the event. Delivery happens in the background
// and its outcome is only logged.
async fn invite(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<public::InviteRequest>,
) -> Result<StatusCode, ApiError> {
    let event = events_db::get_event(&state.db, session.user_id().to_string(), id).await?;
    let message = compose_invite(
        &state.config.mail,
        &state.config.invite_domain,
        &Invite {
            event: &event,
            recipients: &request.recipients,
            message: request.message.as_deref(),
            cancelled: request.cancelled,
        },
    )?;

    let mailer = Arc::clone(&state.mailer);
    tokio::spawn(async move {
        let _ = send_invite(mailer, &event.id, message).await;
    });

    Ok(StatusCode::ACCEPTED)
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/generate", post(generate_event))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/{id}/invite", post(invite))
}
