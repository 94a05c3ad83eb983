//! Invite mail composition and SMTP delivery.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::ics::{invite_summary, render_invite};
use crate::api::public::events::Event;
use crate::core::{Error, MailConfig, Result};

const ATTACHMENT_NAME: &str = "event.ics";

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// STARTTLS submission authenticated as the sender address.
    pub fn from_config(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.from_address.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: Message) -> Result<()> {
        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Upstream(format!("mail transport failed: {}", e)))?;
        Ok(())
    }
}

pub struct Invite<'a> {
    pub event: &'a Event,
    pub recipients: &'a [String],
    pub message: Option<&'a str>,
    pub cancelled: bool,
}

fn default_body(event: &Event, cancelled: bool) -> String {
    if cancelled {
        format!("{} has been cancelled.", event.title)
    } else {
        format!("You have been invited to {}.", event.title)
    }
}

fn sender(config: &MailConfig) -> Result<Mailbox> {
    let address: Address = config
        .from_address
        .parse()
        .map_err(|_| Error::Upstream(format!("invalid sender {}", config.from_address)))?;
    Ok(Mailbox::new(Some(config.from_name.clone()), address))
}

/// Build the invite message: a plain text body followed by the
/// calendar attachment. Fails with `BadRequest` on an unparseable
/// recipient.
pub fn compose_invite(config: &MailConfig, domain: &str, invite: &Invite) -> Result<Message> {
    if invite.recipients.is_empty() {
        return Err(Error::BadRequest(String::from(
            "At least one recipient is required",
        )));
    }

    let mut builder = Message::builder()
        .from(sender(config)?)
        .subject(invite_summary(&invite.event.title, invite.cancelled));
    for recipient in invite.recipients {
        let mailbox: Mailbox = recipient
            .trim()
            .parse()
            .map_err(|_| Error::BadRequest(format!("Invalid recipient {}", recipient)))?;
        builder = builder.to(mailbox);
    }

    let body = invite
        .message
        .filter(|m| !m.trim().is_empty())
        .map(String::from)
        .unwrap_or_else(|| default_body(invite.event, invite.cancelled));
    let ics = render_invite(invite.event, invite.cancelled, domain)?;
    let calendar_type = ContentType::parse("text/calendar; charset=utf-8")
        .map_err(|e| Error::Upstream(e.to_string()))?;

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body))
                .singlepart(Attachment::new(String::from(ATTACHMENT_NAME)).body(ics, calendar_type)),
        )
        .map_err(|e| Error::BadRequest(e.to_string()))
}

/// Deliver a composed invite. Failures are logged here; callers that
/// fire and forget can drop the result.
pub async fn send_invite(mailer: Arc<dyn Mailer>, event_id: &str, message: Message) -> Result<()> {
    match mailer.send(message).await {
        Ok(()) => {
            tracing::info!("Sent invite for event {}", event_id);
            Ok(())
        }
        Err(err) => {
            tracing::error!("Failed to send invite for event {}: {}", event_id, err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MailConfig {
        MailConfig {
            host: String::from("localhost"),
            port: 587,
            from_address: String::from("calendar@example.com"),
            from_name: String::from("Calendar"),
            password: String::from("secret"),
        }
    }

    fn event() -> Event {
        Event {
            id: String::from("evt-1"),
            calendar_id: String::from("cal-1"),
            title: String::from("Standup"),
            description: None,
            duration: 15,
            date: String::from("2024-01-01T09:00:00Z"),
            recurrence_id: None,
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn it_composes_a_multipart_invite() {
        let event = event();
        let recipients = vec![
            String::from("ada@example.com"),
            String::from("alan@example.com"),
        ];
        let message = compose_invite(
            &config(),
            "example.com",
            &Invite {
                event: &event,
                recipients: &recipients,
                message: Some("See you there"),
                cancelled: false,
            },
        )
        .unwrap();

        let raw = formatted(&message);
        assert!(raw.contains("Subject: Standup"));
        assert!(raw.contains("ada@example.com"));
        assert!(raw.contains("alan@example.com"));
        assert!(raw.contains("calendar@example.com"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("See you there"));
        assert!(raw.contains("text/calendar"));
        assert!(raw.contains("event.ics"));
        assert!(raw.contains("UID:evt-1@example.com"));
    }

    #[test]
    fn it_prefixes_cancellations() {
        let event = event();
        let recipients = vec![String::from("ada@example.com")];
        let message = compose_invite(
            &config(),
            "example.com",
            &Invite {
                event: &event,
                recipients: &recipients,
                message: None,
                cancelled: true,
            },
        )
        .unwrap();

        let raw = formatted(&message);
        assert!(raw.contains("Subject: CANCELLED: Standup"));
        assert!(raw.contains("STATUS:CANCELLED"));
        assert!(raw.contains("Standup has been cancelled."));
    }

    #[test]
    fn it_rejects_bad_recipients() {
        let event = event();
        let recipients = vec![String::from("not an address")];
        let result = compose_invite(
            &config(),
            "example.com",
            &Invite {
                event: &event,
                recipients: &recipients,
                message: None,
                cancelled: false,
            },
        );
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[test]
    fn it_requires_a_recipient() {
        let event = event();
        let result = compose_invite(
            &config(),
            "example.com",
            &Invite {
                event: &event,
                recipients: &[],
                message: None,
                cancelled: false,
            },
        );
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }
}
