//! Request extractor resolving the caller's session.

use axum::extract::FromRequestParts;
use axum_extra::extract::cookie::CookieJar;
use http::request::Parts;

use super::public::ApiError;
use super::state::SharedState;
use crate::core::Error;
use crate::identity::{SESSION_COOKIE, Session};

impl FromRequestParts<SharedState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

        state
            .identity
            .whoami(token.as_deref())
            .await?
            .ok_or_else(|| ApiError::from(Error::Unauthorized))
    }
}
