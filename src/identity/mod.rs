//! Session resolution against the external identity provider.
//!
//! Handlers never talk to the provider directly. They go through the
//! [`IdentityProvider`] chosen at startup: [`KratosIdentityProvider`]
//! in production, [`FixtureIdentityProvider`] in development.

mod fixture;
mod kratos;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;

pub use fixture::FixtureIdentityProvider;
pub use kratos::KratosIdentityProvider;
pub use models::{Identity, Session, Traits};

use crate::core::{AppConfig, Result};

/// Name of the cookie carrying the identity provider session.
pub const SESSION_COOKIE: &str = "ory_kratos_session";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a session cookie value to an active session. `None`
    /// means the caller is not authenticated.
    async fn whoami(&self, session_token: Option<&str>) -> Result<Option<Session>>;

    /// Every known identity, for picking calendar members.
    async fn list_users(&self) -> Result<Vec<Traits>>;
}

pub fn from_config(config: &AppConfig) -> Arc<dyn IdentityProvider> {
    if config.environment.is_development() {
        Arc::new(FixtureIdentityProvider::default())
    } else {
        Arc::new(KratosIdentityProvider::new(
            &config.kratos_public_url,
            &config.kratos_admin_url,
        ))
    }
}
