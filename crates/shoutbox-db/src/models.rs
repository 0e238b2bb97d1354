/// Database row types — these map directly to SQLite rows.
/// Distinct from the shoutbox-types API models to keep the DB layer
/// independent; timestamps stay in SQLite's text form here.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub text: String,
    pub view_count: i64,
    pub owner_id: i64,
    pub created_at: String,
}
