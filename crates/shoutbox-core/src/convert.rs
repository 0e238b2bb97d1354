use chrono::{DateTime, NaiveDateTime, Utc};
use shoutbox_db::models::{MessageRow, UserRow};
use shoutbox_types::models::{Message, User};
use tracing::warn;

pub(crate) fn user(row: UserRow) -> User {
    let created_at = timestamp(&row.created_at, row.id);
    User {
        id: row.id,
        username: row.username,
        created_at,
    }
}

pub(crate) fn message(row: MessageRow) -> Message {
    let created_at = timestamp(&row.created_at, row.id);
    Message {
        id: row.id,
        text: row.text,
        view_count: row.view_count,
        owner_id: row.owner_id,
        created_at,
    }
}

fn timestamp(raw: &str, row_id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on row {}: {}", raw, row_id, e);
            DateTime::default()
        })
}
