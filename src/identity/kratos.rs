use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;

use super::{Identity, IdentityProvider, SESSION_COOKIE, Session, Traits};
use crate::core::{Error, Result};

pub struct KratosIdentityProvider {
    public_url: String,
    admin_url: String,
    client: reqwest::Client,
}

impl KratosIdentityProvider {
    pub fn new(public_url: &str, admin_url: &str) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            admin_url: admin_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

fn upstream(err: reqwest::Error) -> Error {
    tracing::error!("Identity provider request failed: {}", err);
    Error::Upstream(String::from("identity provider unreachable"))
}

#[async_trait]
impl IdentityProvider for KratosIdentityProvider {
    async fn whoami(&self, session_token: Option<&str>) -> Result<Option<Session>> {
        let Some(token) = session_token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let response = self
            .client
            .get(format!("{}/sessions/whoami", self.public_url))
            .header(http::header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(upstream)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::error!("Identity provider returned {} for whoami", status);
            return Err(Error::Upstream(format!(
                "identity provider returned {}",
                status
            )));
        }

        let session: Session = response.json().await.map_err(upstream)?;
        if !session.active {
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn list_users(&self) -> Result<Vec<Traits>> {
        let identities: Vec<Identity> = self
            .client
            .get(format!("{}/admin/identities", self.admin_url))
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        Ok(identities.into_iter().map(|i| i.traits).collect())
    }
}
