//! iCalendar rendering for event invites.

use chrono::Duration;
use icalendar::{Calendar, Component, EventLike};

use crate::api::public::events::Event;
use crate::core::{Error, Result};
use crate::core::time::parse_timestamp;

const ICS_DATETIME: &str = "%Y%m%dT%H%M%SZ";
const WEEKLY_RULE: &str = "FREQ=WEEKLY;INTERVAL=1";

pub fn invite_summary(title: &str, cancelled: bool) -> String {
    if cancelled {
        format!("CANCELLED: {}", title)
    } else {
        title.to_string()
    }
}

/// Render a single `VEVENT` calendar for `event`. Events belonging to a
/// series carry a weekly `RRULE`.
pub fn render_invite(event: &Event, cancelled: bool, domain: &str) -> Result<String> {
    let start = parse_timestamp(&event.date)?;
    let end = Duration::try_minutes(event.duration)
        .and_then(|duration| start.checked_add_signed(duration))
        .ok_or_else(|| {
            Error::BadRequest(format!("Event duration {} is out of range", event.duration))
        })?;

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@{}", event.id, domain));
    ics_event.summary(&invite_summary(&event.title, cancelled));
    ics_event.add_property("DTSTAMP", chrono::Utc::now().format(ICS_DATETIME).to_string());
    ics_event.add_property("DTSTART", start.format(ICS_DATETIME).to_string());
    ics_event.add_property("DTEND", end.format(ICS_DATETIME).to_string());

    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        ics_event.description(description);
    }
    if event.is_recurring() {
        ics_event.add_property("RRULE", WEEKLY_RULE);
    }
    ics_event.add_property("STATUS", if cancelled { "CANCELLED" } else { "CONFIRMED" });

    let mut calendar = Calendar::new();
    calendar.push(ics_event.done());
    Ok(calendar.done().to_string())
}
