//! Database queries for the events API. Every lookup is scoped to
//! calendars the caller is a member of.
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};

use super::public::{CreateEventRequest, Event, UpdateEventRequest};
use crate::api::routes::calendars::db::is_member;
use crate::core::time::{format_timestamp, parse_timestamp};
use crate::core::{Error, Result};
use crate::recurrence::{self, Scope, day_modifier, shift_date, shift_in_days};

const EVENT_COLUMNS: &str = "id, calendar_id, title, description, duration, date, recurrence_id";

fn event_from_row(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        calendar_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        duration: row.get(4)?,
        date: row.get(5)?,
        recurrence_id: row.get(6)?,
    })
}

fn find_visible_event(
    conn: &rusqlite::Connection,
    user_id: &str,
    id: &str,
) -> rusqlite::Result<Option<Event>> {
    conn.query_row(
        &format!(
            r"
            SELECT {EVENT_COLUMNS}
            FROM events e
            WHERE e.id = ?1
            AND EXISTS (
                SELECT 1 FROM calendar_members m
                WHERE m.calendar_id = e.calendar_id AND m.user_id = ?2
            )
            "
        ),
        params![id, user_id],
        event_from_row,
    )
    .optional()
}

pub async fn list_events(db: &Connection, user_id: String) -> Result<Vec<Event>> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(&format!(
            r"
            SELECT {EVENT_COLUMNS}
            FROM events e
            WHERE EXISTS (
                SELECT 1 FROM calendar_members m
                WHERE m.calendar_id = e.calendar_id AND m.user_id = ?1
            )
            ORDER BY date, id
            "
        ))?;
        let events = stmt
            .query_map([&user_id], event_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    })
    .await
    .map_err(Error::from_call)
}

pub async fn get_event(db: &Connection, user_id: String, id: String) -> Result<Event> {
    db.call(move |conn| {
        find_visible_event(conn, &user_id, &id)?.ok_or_else(|| Error::NotFound("Event").abort())
    })
    .await
    .map_err(Error::from_call)
}

/// Persist a one-off event, or the whole weekly series when
/// `request.recurring` is set, in one transaction. Returns the
/// occurrence at the anchor date.
pub async fn create_event(
    db: &Connection,
    user_id: String,
    request: CreateEventRequest,
    anchor: DateTime<Utc>,
) -> Result<Event> {
    let rows: Vec<Event> = recurrence::expand(anchor, request.recurring)?
        .into_iter()
        .map(|occurrence| Event {
            id: occurrence.id,
            calendar_id: request.calendar_id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            duration: request.duration,
            date: format_timestamp(&occurrence.date),
            recurrence_id: occurrence.recurrence_id,
        })
        .collect();
    let calendar_id = request.calendar_id;

    let first = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            if !is_member(&tx, &calendar_id, &user_id)? {
                return Err(Error::NotFound("Calendar").abort());
            }
            {
                let mut stmt = tx.prepare(&format!(
                    "INSERT INTO events ({EVENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ))?;
                for event in rows.iter() {
                    stmt.execute(params![
                        event.id,
                        event.calendar_id,
                        event.title,
                        event.description,
                        event.duration,
                        event.date,
                        event.recurrence_id,
                    ])?;
                }
            }
            tx.commit()?;
            tracing::debug!("Inserted {} occurrence(s)", rows.len());
            Ok(rows.into_iter().next())
        })
        .await
        .map_err(Error::from_call)?;

    first.ok_or(Error::NotFound("Event"))
}

/// Apply `patch` to one event, or to it and every later occurrence of
/// its series. A single-scope update detaches the event from its
/// series. A series update shifts each affected date by the whole-day
/// difference between the event's current date and `requested`.
pub async fn update_event(
    db: &Connection,
    user_id: String,
    id: String,
    patch: UpdateEventRequest,
    requested: DateTime<Utc>,
    scope: Scope,
) -> Result<Event> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let target = find_visible_event(&tx, &user_id, &id)?
            .ok_or_else(|| Error::NotFound("Event").abort())?;

        match scope {
            Scope::Single => {
                tx.execute(
                    r"
                    UPDATE events
                    SET title = ?1, description = ?2, duration = ?3, date = ?4, recurrence_id = NULL
                    WHERE id = ?5
                    ",
                    params![
                        patch.title,
                        patch.description,
                        patch.duration,
                        format_timestamp(&requested),
                        target.id,
                    ],
                )?;
            }
            Scope::ThisAndFollowing => {
                let Some(recurrence_id) = target.recurrence_id.clone().filter(|r| !r.is_empty())
                else {
                    return Err(Error::NotRecurring.abort());
                };
                let current = parse_timestamp(&target.date).map_err(Error::abort)?;
                let days = shift_in_days(current, requested);

                // Both ends of the tail have to stay storable after the shift
                let last: String = tx.query_row(
                    "SELECT MAX(date) FROM events WHERE recurrence_id = ?1 AND date >= ?2",
                    params![recurrence_id, target.date],
                    |row| row.get(0),
                )?;
                let last = parse_timestamp(&last).map_err(Error::abort)?;
                shift_date(current, days).map_err(Error::abort)?;
                shift_date(last, days).map_err(Error::abort)?;

                let updated = tx.execute(
                    r"
                    UPDATE events
                    SET title = ?1,
                        description = ?2,
                        duration = ?3,
                        date = strftime('%Y-%m-%dT%H:%M:%SZ', date, ?4)
                    WHERE recurrence_id = ?5 AND date >= ?6
                    ",
                    params![
                        patch.title,
                        patch.description,
                        patch.duration,
                        day_modifier(days),
                        recurrence_id,
                        target.date,
                    ],
                )?;
                tracing::debug!(
                    "Shifted {} occurrence(s) of series {} by {} day(s)",
                    updated,
                    recurrence_id,
                    days
                );
            }
        }

        let event = find_visible_event(&tx, &user_id, &id)?
            .ok_or_else(|| Error::NotFound("Event").abort())?;
        tx.commit()?;
        Ok(event)
    })
    .await
    .map_err(Error::from_call)
}

/// Delete one event, or it and every later occurrence of its series.
/// Returns the number of rows removed.
pub async fn delete_event(
    db: &Connection,
    user_id: String,
    id: String,
    scope: Scope,
) -> Result<usize> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let target = find_visible_event(&tx, &user_id, &id)?
            .ok_or_else(|| Error::NotFound("Event").abort())?;

        let deleted = match scope.for_delete(target.recurrence_id.as_deref()) {
            Scope::Single => tx.execute("DELETE FROM events WHERE id = ?1", [&target.id])?,
            Scope::ThisAndFollowing => tx.execute(
                "DELETE FROM events WHERE recurrence_id = ?1 AND date >= ?2",
                params![target.recurrence_id, target.date],
            )?,
        };
        tx.commit()?;
        Ok(deleted)
    })
    .await
    .map_err(Error::from_call)
}
