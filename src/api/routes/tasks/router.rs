//! Router for the tasks API

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use super::db as tasks_db;
use super::public;
use crate::api::public::{ApiError, JsonBody};
use crate::api::state::SharedState;
use crate::core::Error;
use crate::core::time::{MAX_DURATION_MINUTES, normalize_timestamp};
use crate::identity::Session;

fn validate(mut request: public::TaskRequest) -> Result<public::TaskRequest, Error> {
    if request.title.trim().is_empty() {
        return Err(Error::BadRequest(String::from("Task title is required")));
    }
    if request.duration < 0 {
        return Err(Error::BadRequest(String::from(
            "Task duration must not be negative",
        )));
    }
    if request.duration > MAX_DURATION_MINUTES {
        return Err(Error::BadRequest(format!(
            "Task duration must not exceed {} minutes",
            MAX_DURATION_MINUTES
        )));
    }
    request.deadline = normalize_timestamp(&request.deadline)?;
    request.calendar_id = request.calendar_id.filter(|id| !id.is_empty());
    Ok(request)
}

async fn list_tasks(
    State(state): State<SharedState>,
    session: Session,
) -> Result<Json<Vec<public::Task>>, ApiError> {
    let tasks = tasks_db::list_tasks(&state.db, session.user_id().to_string()).await?;
    Ok(Json(tasks))
}

async fn get_task(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<public::Task>, ApiError> {
    let task = tasks_db::get_task(&state.db, session.user_id().to_string(), id).await?;
    Ok(Json(task))
}

async fn create_task(
    State(state): State<SharedState>,
    session: Session,
    JsonBody(request): JsonBody<public::TaskRequest>,
) -> Result<Json<public::Task>, ApiError> {
    let request = validate(request)?;
    let task = tasks_db::create_task(&state.db, session.user_id().to_string(), request).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<public::TaskRequest>,
) -> Result<Json<public::Task>, ApiError> {
    let request = validate(request)?;
    let task =
        tasks_db::update_task(&state.db, session.user_id().to_string(), id, request).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<SharedState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<(), ApiError> {
    tasks_db::delete_task(&state.db, session.user_id().to_string(), id).await?;
    Ok(())
}

/// Create the tasks router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
