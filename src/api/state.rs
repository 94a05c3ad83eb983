use std::sync::Arc;

use anyhow::Result;
use tokio_rusqlite::Connection;

use crate::ai::{EventExtractor, OpenAiEventExtractor};
use crate::core::AppConfig;
use crate::identity::{self, IdentityProvider};
use crate::notify::{Mailer, SmtpMailer};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    pub identity: Arc<dyn IdentityProvider>,
    pub extractor: Arc<dyn EventExtractor>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        db: Connection,
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        extractor: Arc<dyn EventExtractor>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            config,
            identity,
            extractor,
            mailer,
        }
    }

    /// Wire up the real collaborators for `config`. The identity
    /// provider is the development fixture or Kratos depending on the
    /// configured environment.
    pub fn from_config(db: Connection, config: AppConfig) -> Result<Self> {
        let identity = identity::from_config(&config);
        let extractor = Arc::new(OpenAiEventExtractor::from_config(&config));
        let mailer = Arc::new(SmtpMailer::from_config(&config.mail)?);
        Ok(Self::new(db, config, identity, extractor, mailer))
    }
}
