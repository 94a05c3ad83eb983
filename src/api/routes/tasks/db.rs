//! Database queries for the tasks API. Tasks belong to exactly one
//! user and every statement filters on it.
use rusqlite::OptionalExtension;
use tokio_rusqlite::{Connection, params};
use uuid::Uuid;

use super::public::{Task, TaskRequest};
use crate::api::routes::calendars::db::is_member;
use crate::core::{Error, Result};

const TASK_COLUMNS: &str = "id, user_id, calendar_id, title, description, duration, deadline, difficulty, priority, completed";

fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        calendar_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        duration: row.get(5)?,
        deadline: row.get(6)?,
        difficulty: row.get(7)?,
        priority: row.get(8)?,
        completed: row.get(9)?,
    })
}

fn find_task(
    conn: &rusqlite::Connection,
    user_id: &str,
    id: &str,
) -> rusqlite::Result<Option<Task>> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND user_id = ?2"),
        params![id, user_id],
        task_from_row,
    )
    .optional()
}

fn check_calendar(
    conn: &rusqlite::Connection,
    user_id: &str,
    calendar_id: Option<&str>,
) -> std::result::Result<(), tokio_rusqlite::Error> {
    if let Some(calendar_id) = calendar_id {
        if !is_member(conn, calendar_id, user_id)? {
            return Err(Error::NotFound("Calendar").abort());
        }
    }
    Ok(())
}

pub async fn list_tasks(db: &Connection, user_id: String) -> Result<Vec<Task>> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY deadline, id"
        ))?;
        let tasks = stmt
            .query_map([&user_id], task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    })
    .await
    .map_err(Error::from_call)
}

pub async fn get_task(db: &Connection, user_id: String, id: String) -> Result<Task> {
    db.call(move |conn| find_task(conn, &user_id, &id)?.ok_or_else(|| Error::NotFound("Task").abort()))
        .await
        .map_err(Error::from_call)
}

/// `request.deadline` must already be normalized.
pub async fn create_task(db: &Connection, user_id: String, request: TaskRequest) -> Result<Task> {
    let task = Task {
        id: Uuid::new_v4().to_string(),
        user_id,
        calendar_id: request.calendar_id,
        title: request.title,
        description: request.description,
        duration: request.duration,
        deadline: request.deadline,
        difficulty: request.difficulty,
        priority: request.priority,
        completed: request.completed,
    };

    let row = task.clone();
    db.call(move |conn| {
        check_calendar(conn, &row.user_id, row.calendar_id.as_deref())?;
        conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                row.id,
                row.user_id,
                row.calendar_id,
                row.title,
                row.description,
                row.duration,
                row.deadline,
                row.difficulty,
                row.priority,
                row.completed,
            ],
        )?;
        Ok(())
    })
    .await
    .map_err(Error::from_call)?;

    Ok(task)
}

pub async fn update_task(
    db: &Connection,
    user_id: String,
    id: String,
    request: TaskRequest,
) -> Result<Task> {
    db.call(move |conn| {
        let tx = conn.transaction()?;
        check_calendar(&tx, &user_id, request.calendar_id.as_deref())?;
        let updated = tx.execute(
            r"
            UPDATE tasks
            SET calendar_id = ?1,
                title = ?2,
                description = ?3,
                duration = ?4,
                deadline = ?5,
                difficulty = ?6,
                priority = ?7,
                completed = ?8
            WHERE id = ?9 AND user_id = ?10
            ",
            params![
                request.calendar_id,
                request.title,
                request.description,
                request.duration,
                request.deadline,
                request.difficulty,
                request.priority,
                request.completed,
                id,
                user_id,
            ],
        )?;
        if updated == 0 {
            return Err(Error::NotFound("Task").abort());
        }
        let task = find_task(&tx, &user_id, &id)?.ok_or_else(|| Error::NotFound("Task").abort())?;
        tx.commit()?;
        Ok(task)
    })
    .await
    .map_err(Error::from_call)
}

pub async fn delete_task(db: &Connection, user_id: String, id: String) -> Result<()> {
    let deleted = db
        .call(move |conn| {
            Ok(conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )?)
        })
        .await
        .map_err(Error::from_call)?;

    if deleted == 0 {
        return Err(Error::NotFound("Task"));
    }
    Ok(())
}
