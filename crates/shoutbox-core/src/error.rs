use thiserror::Error;

/// Every way a core operation can fail. The presentation layer decides
/// user-facing wording; nothing in here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation requires a signed-in caller.
    #[error("authentication required")]
    Unauthenticated,

    /// Unknown username and wrong password collapse into this one kind so
    /// a failed login never reveals whether the account exists.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username already taken")]
    UsernameTaken,

    /// Message text is bounded at 1..=160 characters.
    #[error("message text must be 1 to 160 characters, got {len}")]
    InvalidText { len: usize },

    /// The target row is absent or belongs to someone else; callers cannot
    /// tell which, so non-owners cannot probe for existence.
    #[error("not found")]
    NotFound,

    /// The underlying store failed. The triggering operation's transaction
    /// has been rolled back.
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Storage(e)
    }
}
