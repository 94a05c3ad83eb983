use std::env;

use anyhow::{Context, Result, anyhow};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Anything other than "development" runs as production.
    pub fn from_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub from_address: String,
    pub from_name: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: Environment,
    pub kratos_public_url: String,
    pub kratos_admin_url: String,
    pub database_url: String,
    pub invite_domain: String,
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub source_timezone: String,
    pub mail: MailConfig,
}

impl AppConfig {
    /// Build the config from process environment variables. Fails when
    /// `DATABASE_URL` or `MAIL_PASSWORD` are missing.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("{} must be set", key))
        };

        let database_url = required("DATABASE_URL")?;
        let password = required("MAIL_PASSWORD")?;
        let port = var("MAIL_PORT", "587")
            .parse::<u16>()
            .context("MAIL_PORT must be a valid port number")?;

        Ok(Self {
            environment: Environment::from_value(&var("ENVIRONMENT", "development")),
            kratos_public_url: var("KRATOS_PUBLIC_URL", "http://127.0.0.1:4433"),
            kratos_admin_url: var("KRATOS_ADMIN_URL", "http://127.0.0.1:4434"),
            database_url,
            invite_domain: var("INVITE_DOMAIN", "localhost"),
            openai_api_hostname: var("OPENAI_API_HOSTNAME", "https://api.openai.com"),
            openai_api_key: var("OPENAI_API_KEY", ""),
            openai_model: var("OPENAI_MODEL", "gpt-4o-mini"),
            source_timezone: var("EVENT_SOURCE_TIMEZONE", "Eastern Time (ET)"),
            mail: MailConfig {
                host: var("MAIL_HOST", "localhost"),
                port,
                from_address: var("MAIL_FROM", "calendar@localhost"),
                from_name: var("MAIL_FROM_NAME", "Calendar"),
                password,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serial_test::serial;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn it_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&[("MAIL_PASSWORD", "secret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn it_requires_mail_password() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "db.sqlite")])).unwrap_err();
        assert!(err.to_string().contains("MAIL_PASSWORD"));
    }

    #[test]
    fn it_applies_defaults() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "db.sqlite"),
            ("MAIL_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.mail.port, 587);
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.kratos_public_url, "http://127.0.0.1:4433");
    }

    #[test]
    fn it_rejects_invalid_mail_port() {
        let result = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "db.sqlite"),
            ("MAIL_PASSWORD", "secret"),
            ("MAIL_PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn it_treats_unknown_environment_as_production() {
        assert_eq!(Environment::from_value("staging"), Environment::Production);
        assert_eq!(Environment::from_value("production"), Environment::Production);
        assert_eq!(Environment::from_value("Development"), Environment::Development);
    }

    #[test]
    #[serial]
    fn it_reads_from_process_env() {
        // SAFETY: serialized with every other test that touches the env
        unsafe {
            env::set_var("DATABASE_URL", ":memory:");
            env::set_var("MAIL_PASSWORD", "secret");
            env::set_var("ENVIRONMENT", "production");
        }
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.database_url, ":memory:");
        assert_eq!(config.environment, Environment::Production);
        unsafe {
            env::remove_var("DATABASE_URL");
            env::remove_var("MAIL_PASSWORD");
            env::remove_var("ENVIRONMENT");
        }
    }
}
