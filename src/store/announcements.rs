use super::{exists, new_id};
use crate::error::StoreError;
use crate::model::Announcement;
use crate::validate::NewAnnouncement;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const COLUMNS: &str = "id, title, content, created_at, is_active, priority";

pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Announcement> {
    Ok(Announcement {
        id: r.get("id")?,
        title: r.get("title")?,
        content: r.get("content")?,
        created_at: r.get("created_at")?,
        is_active: r.get::<_, i64>("is_active")? != 0,
        priority: r.get("priority")?,
    })
}

pub fn get(conn: &Connection, id: &str) -> Result<Announcement, StoreError> {
    let sql = format!("SELECT {} FROM announcements WHERE id = ?", COLUMNS);
    conn.query_row(&sql, [id], from_row)
        .optional()?
        .ok_or_else(|| StoreError::not_found("announcement", id))
}

pub fn create(
    conn: &Connection,
    input: &NewAnnouncement,
    now: DateTime<Utc>,
) -> Result<Announcement, StoreError> {
    let id = new_id();
    conn.execute(
        "INSERT INTO announcements(id, title, content, created_at, is_active, priority)
         VALUES(?, ?, ?, ?, ?, ?)",
        params![
            id,
            input.title,
            input.content,
            now,
            input.is_active as i64,
            input.priority,
        ],
    )?;
    tracing::info!(announcement_id = %id, priority = %input.priority, "announcement created");
    get(conn, &id)
}

pub fn update(conn: &Connection, id: &str, input: &NewAnnouncement) -> Result<Announcement, StoreError> {
    if !exists(conn, "announcements", id)? {
        return Err(StoreError::not_found("announcement", id));
    }
    conn.execute(
        "UPDATE announcements SET title = ?, content = ?, is_active = ?, priority = ?
         WHERE id = ?",
        params![
            input.title,
            input.content,
            input.is_active as i64,
            input.priority,
            id,
        ],
    )?;
    tracing::info!(announcement_id = %id, "announcement updated");
    get(conn, id)
}

pub fn delete(conn: &Connection, id: &str) -> Result<(), StoreError> {
    let n = conn.execute("DELETE FROM announcements WHERE id = ?", [id])?;
    if n == 0 {
        return Err(StoreError::not_found("announcement", id));
    }
    tracing::info!(announcement_id = %id, "announcement deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::model::Priority;
    use crate::store::fixtures;
    use chrono::TimeZone;

    #[test]
    fn update_keeps_creation_time() {
        let conn = db::open_in_memory().expect("db");
        let at = Utc.with_ymd_and_hms(2024, 9, 1, 8, 30, 0).single().expect("time");
        let a = create(&conn, &fixtures::announcement("Exams", true), at).expect("create");
        assert_eq!(a.created_at, at);
        assert_eq!(a.priority, Priority::High);

        let mut edit = fixtures::announcement("Exams moved", false);
        edit.priority = Priority::Low;
        let u = update(&conn, &a.id, &edit).expect("update");
        assert_eq!(u.title, "Exams moved");
        assert!(!u.is_active);
        assert_eq!(u.priority, Priority::Low);
        assert_eq!(u.created_at, at);
    }
}
