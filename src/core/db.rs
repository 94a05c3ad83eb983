use anyhow::{Context, Result};
use tokio_rusqlite::Connection;

/// Open the database named by `DATABASE_URL`. Accepts a filesystem
/// path, a `sqlite://` URL or `:memory:`.
pub async fn async_db(database_url: &str) -> Result<Connection> {
    let path = database_url
        .strip_prefix("sqlite://")
        .unwrap_or(database_url);

    let db = if path == ":memory:" {
        Connection::open_in_memory().await
    } else {
        Connection::open(path).await
    }
    .with_context(|| format!("Failed to open database at {}", path))?;

    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .await?;

    Ok(db)
}

/// Create every table and index if it doesn't already exist. Safe to
/// run on every startup.
pub fn initialize_db(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r"
        BEGIN;

        CREATE TABLE IF NOT EXISTS calendars (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '',
            is_default INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS calendar_members (
            calendar_id TEXT NOT NULL REFERENCES calendars(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            PRIMARY KEY (calendar_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS calendar_members_user_id_idx
            ON calendar_members(user_id);

        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            calendar_id TEXT NOT NULL REFERENCES calendars(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            duration INTEGER NOT NULL,
            date TEXT NOT NULL,
            recurrence_id TEXT
        );

        CREATE INDEX IF NOT EXISTS events_recurrence_idx
            ON events(recurrence_id, date);

        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            calendar_id TEXT REFERENCES calendars(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            description TEXT,
            duration INTEGER NOT NULL DEFAULT 0,
            deadline TEXT NOT NULL,
            difficulty INTEGER NOT NULL DEFAULT 0,
            priority INTEGER NOT NULL DEFAULT 0,
            completed INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS tasks_user_id_idx ON tasks(user_id);

        COMMIT;
        ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn it_initializes_the_schema_twice() {
        let db = async_db(":memory:").await.unwrap();
        let tables = db
            .call(|conn| {
                initialize_db(conn)?;
                initialize_db(conn)?;
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .filter_map(std::result::Result::ok)
                    .collect::<Vec<_>>();
                Ok(names)
            })
            .await
            .unwrap();

        assert_eq!(
            tables,
            vec!["calendar_members", "calendars", "events", "tasks"]
        );
    }

    #[tokio::test]
    async fn it_opens_a_file_database_from_a_sqlite_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calendar.db");
        let url = format!("sqlite://{}", path.display());

        let db = async_db(&url).await.unwrap();
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn it_enables_foreign_keys() {
        let db = async_db(":memory:").await.unwrap();
        let enabled: i64 = db
            .call(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
