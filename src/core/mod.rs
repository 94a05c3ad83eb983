pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use config::{AppConfig, Environment, MailConfig};
pub use error::{Error, Result};
