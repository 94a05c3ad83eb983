//! Outbound notifications: calendar invites sent by email.

pub mod ics;
pub mod mail;

pub use ics::render_invite;
pub use mail::{Invite, Mailer, SmtpMailer, compose_invite, send_invite};
