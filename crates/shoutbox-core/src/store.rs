use std::sync::Arc;

use tracing::info;

use shoutbox_db::Database;
use shoutbox_types::input::{MessageEdit, NewMessage};
use shoutbox_types::models::Message;

use crate::convert;
use crate::error::Error;
use crate::identity::Caller;

/// Upper bound on message text, in characters.
pub const TEXT_LIMIT: usize = 160;

/// The authoritative CRUD and view-accounting engine. Mutations are
/// scoped to the owning identity; the public listing is the one read that
/// mutates (every render bumps every message's view counter).
pub struct MessageStore {
    db: Arc<Database>,
}

impl MessageStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Full board snapshot in insertion order. Incrementing the counters
    /// commits atomically with the read: after N calls with no edits in
    /// between, every message's counter has moved by exactly N.
    pub fn list_for_display(&self) -> Result<Vec<Message>, Error> {
        let rows = self.db.list_and_touch_messages()?;
        Ok(rows.into_iter().map(convert::message).collect())
    }

    pub fn create(&self, caller: &Caller, input: NewMessage) -> Result<Message, Error> {
        let who = caller.identity()?;
        validate_text(&input.text)?;

        let row = self.db.insert_message(who.user_id, &input.text)?;
        info!("User {} posted message {}", who.user_id, row.id);
        Ok(convert::message(row))
    }

    /// Replace the text of one of the caller's own messages. A successful
    /// edit resets the view counter to zero; the freshness signal starts
    /// over. A miss means the id is absent or the message is someone
    /// else's — the caller cannot tell which.
    pub fn edit(&self, caller: &Caller, input: MessageEdit) -> Result<Message, Error> {
        let who = caller.identity()?;
        validate_text(&input.text)?;

        let row = self
            .db
            .update_message(input.id, who.user_id, &input.text)?
            .ok_or(Error::NotFound)?;
        info!("User {} edited message {}", who.user_id, row.id);
        Ok(convert::message(row))
    }

    /// Hard delete of one of the caller's own messages; same merged miss
    /// as `edit`. Once gone, the id never resolves again.
    pub fn delete(&self, caller: &Caller, message_id: i64) -> Result<(), Error> {
        let who = caller.identity()?;

        if !self.db.delete_message(message_id, who.user_id)? {
            return Err(Error::NotFound);
        }
        info!("User {} deleted message {}", who.user_id, message_id);
        Ok(())
    }

    /// The caller's own messages in creation order, for the edit/delete
    /// pickers. Does not touch view counters.
    pub fn list_owned(&self, caller: &Caller) -> Result<Vec<Message>, Error> {
        let who = caller.identity()?;
        let rows = self.db.list_messages_by_owner(who.user_id)?;
        Ok(rows.into_iter().map(convert::message).collect())
    }
}

fn validate_text(text: &str) -> Result<(), Error> {
    let len = text.chars().count();
    if len == 0 || len > TEXT_LIMIT {
        return Err(Error::InvalidText { len });
    }
    Ok(())
}
