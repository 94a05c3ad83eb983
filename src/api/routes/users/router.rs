//! Router for the users API

use axum::{Json, Router, extract::State, routing::get};

use super::public::User;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::identity::Session;

// Everyone registered with the identity provider, for picking
// calendar members
async fn list_users(
    State(state): State<SharedState>,
    _session: Session,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.identity.list_users().await?;
    Ok(Json(users))
}

/// Create the users router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(list_users))
}
