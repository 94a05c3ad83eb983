//! Database queries for the calendars API
use rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use super::public::{
    Calendar, CreateCalendarRequest, DEFAULT_CALENDAR_COLOR, UpdateCalendarRequest,
};
use crate::core::{Error, Result};

pub fn is_member(
    conn: &rusqlite::Connection,
    calendar_id: &str,
    user_id: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM calendar_members WHERE calendar_id = ?1 AND user_id = ?2)",
        params![calendar_id, user_id],
        |row| row.get(0),
    )
}

fn members_of(conn: &rusqlite::Connection, calendar_id: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM calendar_members WHERE calendar_id = ?1 ORDER BY rowid",
    )?;
    let members = stmt
        .query_map([calendar_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(members)
}

fn find_calendar(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<Calendar>> {
    let calendar = conn
        .query_row(
            "SELECT id, name, color, is_default FROM calendars WHERE id = ?1",
            [id],
            |row| {
                Ok(Calendar {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    is_default: row.get(3)?,
                    members: vec![],
                })
            },
        )
        .optional()?;

    match calendar {
        Some(mut calendar) => {
            calendar.members = members_of(conn, &calendar.id)?;
            Ok(Some(calendar))
        }
        None => Ok(None),
    }
}

/// Calendars the user is a member of, each with its full member list.
pub async fn list_calendars(db: &Connection, user_id: String) -> Result<Vec<Calendar>> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            r"
            SELECT c.id, c.name, c.color, c.is_default
            FROM calendar_members m
            JOIN calendars c ON c.id = m.calendar_id
            WHERE m.user_id = ?1
            ORDER BY c.is_default DESC, c.name
            ",
        )?;
        let mut calendars = stmt
            .query_map([&user_id], |row| {
                Ok(Calendar {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    is_default: row.get(3)?,
                    members: vec![],
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for calendar in calendars.iter_mut() {
            calendar.members = members_of(conn, &calendar.id)?;
        }
        Ok(calendars)
    })
    .await
    .map_err(Error::from_call)
}

/// Create a calendar and make the creator its first member.
pub async fn create_calendar(
    db: &Connection,
    user_id: String,
    request: CreateCalendarRequest,
) -> Result<Calendar> {
    let color = if request.is_default {
        DEFAULT_CALENDAR_COLOR.to_string()
    } else {
        request.color
    };
    let calendar = Calendar {
        id: Uuid::new_v4().to_string(),
        name: request.name,
        color,
        is_default: request.is_default,
        members: vec![user_id.clone()],
    };

    let row = calendar.clone();
    db.call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO calendars (id, name, color, is_default) VALUES (?1, ?2, ?3, ?4)",
            params![row.id, row.name, row.color, row.is_default],
        )?;
        tx.execute(
            "INSERT INTO calendar_members (calendar_id, user_id) VALUES (?1, ?2)",
            params![row.id, user_id],
        )?;
        tx.commit()?;
        Ok(())
    })
    .await
    .map_err(Error::from_call)?;

    Ok(calendar)
}

/// Rename or recolor a calendar the user is a member of. An empty
/// color keeps the current one.
pub async fn update_calendar(
    db: &Connection,
    user_id: String,
    id: String,
    request: UpdateCalendarRequest,
) -> Result<Calendar> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        if !is_member(&tx, &id, &user_id)? {
            return Err(Error::NotFound("Calendar").abort());
        }
        tx.execute(
            r"
            UPDATE calendars
            SET name = ?1, color = CASE WHEN ?2 = '' THEN color ELSE ?2 END
            WHERE id = ?3
            ",
            params![request.name, request.color, id],
        )?;
        let calendar = find_calendar(&tx, &id)?.ok_or(Error::NotFound("Calendar").abort())?;
        tx.commit()?;
        Ok(calendar)
    })
    .await
    .map_err(Error::from_call)
}

/// Delete a calendar the user is a member of. Members and events go
/// with it.
pub async fn delete_calendar(db: &Connection, user_id: String, id: String) -> Result<()> {
    let deleted = db
        .call(move |conn| {
            let deleted = conn.execute(
                r"
                DELETE FROM calendars
                WHERE id = ?1
                AND EXISTS (
                    SELECT 1 FROM calendar_members
                    WHERE calendar_id = ?1 AND user_id = ?2
                )
                ",
                params![id, user_id],
            )?;
            Ok(deleted)
        })
        .await
        .map_err(Error::from_call)?;

    if deleted == 0 {
        return Err(Error::NotFound("Calendar"));
    }
    Ok(())
}

/// Add `member_id` to a calendar the acting user belongs to. Adding an
/// existing member is a no-op.
pub async fn add_member(
    db: &Connection,
    user_id: String,
    calendar_id: String,
    member_id: String,
) -> Result<Calendar> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        if !is_member(&tx, &calendar_id, &user_id)? {
            return Err(Error::NotFound("Calendar").abort());
        }
        tx.execute(
            "INSERT OR IGNORE INTO calendar_members (calendar_id, user_id) VALUES (?1, ?2)",
            params![calendar_id, member_id],
        )?;
        let calendar =
            find_calendar(&tx, &calendar_id)?.ok_or(Error::NotFound("Calendar").abort())?;
        tx.commit()?;
        Ok(calendar)
    })
    .await
    .map_err(Error::from_call)
}

/// Remove `member_id` from a calendar. The acting user must be a
/// member themself; otherwise nothing is deleted. Returns the number
/// of rows removed.
pub async fn remove_member(
    db: &Connection,
    user_id: String,
    calendar_id: String,
    member_id: String,
) -> Result<usize> {
    db.call(move |conn| {
        let deleted = conn.execute(
            r"
            DELETE FROM calendar_members
            WHERE calendar_id = ?1
            AND user_id = ?2
            AND EXISTS (
                SELECT 1 FROM calendar_members AS acting
                WHERE acting.calendar_id = ?1 AND acting.user_id = ?3
            )
            ",
            params![calendar_id, member_id, user_id],
        )?;
        Ok(deleted)
    })
    .await
    .map_err(Error::from_call)
}
