use async_trait::async_trait;

use super::{Identity, IdentityProvider, Session, Traits};
use crate::core::Result;

/// Always-authenticated provider for local development and tests.
#[derive(Debug, Clone)]
pub struct FixtureIdentityProvider {
    session: Session,
    users: Vec<Traits>,
}

impl FixtureIdentityProvider {
    pub fn new(session: Session, users: Vec<Traits>) -> Self {
        Self { session, users }
    }

    /// A provider whose session belongs to `user_id`.
    pub fn for_user(user_id: &str) -> Self {
        let mut provider = Self::default();
        provider.session.identity.id = user_id.to_string();
        provider
    }
}

impl Default for FixtureIdentityProvider {
    fn default() -> Self {
        let traits = Traits {
            email: String::from("developer@localhost"),
            first_name: String::from("Local"),
            last_name: String::from("Developer"),
            username: String::from("developer"),
            avatar: String::new(),
        };
        let session = Session {
            id: String::from("development-session"),
            active: true,
            identity: Identity {
                id: String::from("b849d4e4-de61-4c27-b6c6-7f2566f7079f"),
                state: String::from("active"),
                traits: traits.clone(),
            },
        };
        let users = vec![
            traits,
            Traits {
                email: String::from("test@example.com"),
                first_name: String::from("Test"),
                last_name: String::from("User"),
                username: String::from("testuser"),
                avatar: String::new(),
            },
        ];
        Self { session, users }
    }
}

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn whoami(&self, _session_token: Option<&str>) -> Result<Option<Session>> {
        Ok(Some(self.session.clone()))
    }

    async fn list_users(&self) -> Result<Vec<Traits>> {
        Ok(self.users.clone())
    }
}
