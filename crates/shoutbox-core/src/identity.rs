use crate::error::Error;

/// A resolved, authenticated user. Threaded as a value into every store
/// call so authorization is a pure function of (identity, row) and never
/// depends on ambient request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// What the session layer resolved for a request.
#[derive(Debug, Clone)]
pub enum Caller {
    Anonymous,
    User(Identity),
}

impl Caller {
    /// The identity behind this caller, or `Unauthenticated` for anonymous
    /// requests. Store operations that mutate state all start here.
    pub fn identity(&self) -> Result<&Identity, Error> {
        match self {
            Caller::User(identity) => Ok(identity),
            Caller::Anonymous => Err(Error::Unauthenticated),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::User(_))
    }
}

impl From<Identity> for Caller {
    fn from(identity: Identity) -> Self {
        Caller::User(identity)
    }
}
