use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

const USER_COLS: &str = "id, username, password_hash, created_at";
const MESSAGE_COLS: &str = "id, text, view_count, owner_id, created_at";

impl Database {
    // -- Users --

    pub fn insert_user(&self, username: &str, password_hash: &str) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            let row = query_user_by_id(&tx, tx.last_insert_rowid())?
                .ok_or_else(|| anyhow::anyhow!("inserted user row not readable"))?;
            tx.commit()?;
            Ok(row)
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLS} FROM users WHERE username = ?1"
            ))?;
            stmt.query_row([username], user_from_row).optional()
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Returns false when no such user exists.
    pub fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password_hash = ?1 WHERE id = ?2",
                (password_hash, user_id),
            )?;
            Ok(changed > 0)
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, owner_id: i64, text: &str) -> Result<MessageRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO messages (text, view_count, owner_id) VALUES (?1, 0, ?2)",
                (text, owner_id),
            )?;
            let row = query_message_by_id(&tx, tx.last_insert_rowid())?
                .ok_or_else(|| anyhow::anyhow!("inserted message row not readable"))?;
            tx.commit()?;
            Ok(row)
        })
    }

    /// Snapshot of the whole board in insertion order. Rendering the public
    /// listing counts as a view of every message that exists, so the +1
    /// covers the full table and commits atomically with the read; if
    /// anything fails the transaction rolls back and no counter moves.
    pub fn list_and_touch_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("UPDATE messages SET view_count = view_count + 1", [])?;
            let rows = query_messages(&tx, "ORDER BY id", rusqlite::params![])?;
            tx.commit()?;
            Ok(rows)
        })
    }

    /// Read-only: populating the edit/delete picker must not move counters.
    pub fn list_messages_by_owner(&self, owner_id: i64) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            query_messages(
                conn,
                "WHERE owner_id = ?1 ORDER BY id",
                rusqlite::params![owner_id],
            )
        })
    }

    /// Ownership-scoped update: replaces the text and resets the view
    /// counter. Returns None when the id is absent or the row belongs to a
    /// different owner — callers cannot tell which.
    pub fn update_message(
        &self,
        id: i64,
        owner_id: i64,
        new_text: &str,
    ) -> Result<Option<MessageRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE messages SET text = ?1, view_count = 0
                 WHERE id = ?2 AND owner_id = ?3",
                (new_text, id, owner_id),
            )?;
            if changed == 0 {
                return Ok(None);
            }
            let row = query_message_by_id(&tx, id)?;
            tx.commit()?;
            Ok(row)
        })
    }

    /// Ownership-scoped hard delete; same merged miss as `update_message`.
    pub fn delete_message(&self, id: i64, owner_id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND owner_id = ?2",
                (id, owner_id),
            )?;
            Ok(changed > 0)
        })
    }
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLS} FROM users WHERE id = ?1"))?;
    stmt.query_row([id], user_from_row).optional()
}

fn query_message_by_id(conn: &Connection, id: i64) -> Result<Option<MessageRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MESSAGE_COLS} FROM messages WHERE id = ?1"
    ))?;
    stmt.query_row([id], message_from_row).optional()
}

fn query_messages(
    conn: &Connection,
    tail: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {MESSAGE_COLS} FROM messages {tail}"))?;
    let rows = stmt
        .query_map(params, message_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn message_from_row(row: &Row) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        view_count: row.get(2)?,
        owner_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db_with_user(username: &str) -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db.insert_user(username, "$argon2id$test-hash").unwrap();
        (db, user.id)
    }

    #[test]
    fn insert_message_starts_unviewed() {
        let (db, owner) = db_with_user("alice");
        let row = db.insert_message(owner, "hello").unwrap();
        assert_eq!(row.view_count, 0);
        assert_eq!(row.owner_id, owner);
        assert_eq!(row.text, "hello");
    }

    #[test]
    fn touch_increments_every_row() {
        let (db, owner) = db_with_user("alice");
        db.insert_message(owner, "one").unwrap();
        db.insert_message(owner, "two").unwrap();

        db.list_and_touch_messages().unwrap();
        let rows = db.list_and_touch_messages().unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.view_count == 2));
        // Insertion order, not reverse-chronological.
        assert_eq!(rows[0].text, "one");
        assert_eq!(rows[1].text, "two");
    }

    #[test]
    fn owner_listing_does_not_touch_counters() {
        let (db, owner) = db_with_user("alice");
        db.insert_message(owner, "mine").unwrap();

        let rows = db.list_messages_by_owner(owner).unwrap();
        assert_eq!(rows[0].view_count, 0);
        let rows = db.list_messages_by_owner(owner).unwrap();
        assert_eq!(rows[0].view_count, 0);
    }

    #[test]
    fn update_is_scoped_to_owner() {
        let (db, alice) = db_with_user("alice");
        let bob = db.insert_user("bob", "$argon2id$test-hash").unwrap().id;
        let msg = db.insert_message(alice, "original").unwrap();

        assert!(db.update_message(msg.id, bob, "stolen").unwrap().is_none());

        let rows = db.list_messages_by_owner(alice).unwrap();
        assert_eq!(rows[0].text, "original");
    }

    #[test]
    fn update_resets_counter() {
        let (db, owner) = db_with_user("alice");
        let msg = db.insert_message(owner, "before").unwrap();
        db.list_and_touch_messages().unwrap();
        db.list_and_touch_messages().unwrap();

        let row = db.update_message(msg.id, owner, "after").unwrap().unwrap();
        assert_eq!(row.text, "after");
        assert_eq!(row.view_count, 0);
    }

    #[test]
    fn delete_is_scoped_and_permanent() {
        let (db, alice) = db_with_user("alice");
        let bob = db.insert_user("bob", "$argon2id$test-hash").unwrap().id;
        let msg = db.insert_message(alice, "target").unwrap();

        assert!(!db.delete_message(msg.id, bob).unwrap());
        assert!(db.delete_message(msg.id, alice).unwrap());
        assert!(!db.delete_message(msg.id, alice).unwrap());
        assert!(db.list_and_touch_messages().unwrap().is_empty());
    }

    #[test]
    fn schema_rejects_oversized_text() {
        let (db, owner) = db_with_user("alice");
        let long = "x".repeat(161);
        assert!(db.insert_message(owner, &long).is_err());
        assert!(db.insert_message(owner, "").is_err());
    }

    #[test]
    fn duplicate_username_rejected() {
        let (db, _) = db_with_user("alice");
        assert!(db.insert_user("alice", "$argon2id$other").is_err());
    }
}
