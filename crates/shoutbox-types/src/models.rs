use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The password hash never leaves the storage
/// layer, so it is not part of this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A posted message. `view_count` counts how many times the full public
/// listing has been rendered since the message was created or last edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub view_count: i64,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
}
