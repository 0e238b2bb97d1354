use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::info;
use uuid::Uuid;

use shoutbox_db::Database;
use shoutbox_types::models::User;

use crate::convert;
use crate::error::Error;
use crate::identity::{Caller, Identity};

/// Opaque bearer token handed out at login. Held server-side so logout
/// actually invalidates it.
pub type SessionToken = Uuid;

/// Authentication and session binding. Yields `Identity` values for the
/// message store's ownership checks; never exposes credential material.
pub struct AccountService {
    db: Arc<Database>,
    sessions: Mutex<HashMap<SessionToken, Identity>>,
}

impl AccountService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Verify a username/password pair. Unknown username and wrong
    /// password are indistinguishable from the outside.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Identity, Error> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidCredentials);
        }

        let user = self
            .db
            .get_user_by_username(username)?
            .ok_or(Error::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| Error::Storage(anyhow!("stored hash unreadable for user {}: {}", user.id, e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| Error::InvalidCredentials)?;

        Ok(Identity {
            user_id: user.id,
            username: user.username,
        })
    }

    /// Bind an authenticated identity to a fresh session.
    pub fn login(&self, identity: Identity) -> Result<SessionToken, Error> {
        let token = Uuid::new_v4();
        info!("User {} signed in", identity.user_id);
        self.sessions()?.insert(token, identity);
        Ok(token)
    }

    /// Unconditional and idempotent: an unknown or already-cleared token
    /// is a no-op, not an error.
    pub fn logout(&self, token: SessionToken) -> Result<(), Error> {
        self.sessions()?.remove(&token);
        Ok(())
    }

    /// Resolve a request's caller. No validation beyond "is a session
    /// bound to this token".
    pub fn current_identity(&self, token: Option<SessionToken>) -> Result<Caller, Error> {
        let Some(token) = token else {
            return Ok(Caller::Anonymous);
        };
        Ok(match self.sessions()?.get(&token) {
            Some(identity) => Caller::User(identity.clone()),
            None => Caller::Anonymous,
        })
    }

    /// Create an account with a hashed credential. Registration has no
    /// public surface; this is the bootstrap/ops path.
    pub fn provision_user(&self, username: &str, password: &str) -> Result<User, Error> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        if self.db.get_user_by_username(username)?.is_some() {
            return Err(Error::UsernameTaken);
        }

        let hash = hash_password(password)?;
        let row = self.db.insert_user(username, &hash)?;
        info!("Provisioned user '{}' (id {})", row.username, row.id);
        Ok(convert::user(row))
    }

    /// Replace a user's credential. The only permitted user mutation.
    pub fn set_password(&self, user_id: i64, new_password: &str) -> Result<(), Error> {
        if new_password.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        let hash = hash_password(new_password)?;
        if !self.db.set_password_hash(user_id, &hash)? {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<SessionToken, Identity>>, Error> {
        self.sessions
            .lock()
            .map_err(|e| Error::Storage(anyhow!("session lock poisoned: {}", e)))
    }
}

fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Storage(anyhow!("password hashing failed: {}", e)))?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn service() -> AccountService {
        AccountService::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    #[test]
    fn authenticate_round_trip() {
        let accounts = service();
        let user = accounts.provision_user("alice", "hunter22").unwrap();

        let identity = accounts.authenticate("alice", "hunter22").unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn bad_password_and_unknown_user_fail_the_same_way() {
        let accounts = service();
        accounts.provision_user("alice", "hunter22").unwrap();

        let wrong_password = accounts.authenticate("alice", "nope").unwrap_err();
        let unknown_user = accounts.authenticate("nobody", "hunter22").unwrap_err();

        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_user, Error::InvalidCredentials));
    }

    #[test]
    fn empty_credentials_rejected() {
        let accounts = service();
        assert!(matches!(
            accounts.authenticate("", "pw").unwrap_err(),
            Error::InvalidCredentials
        ));
        assert!(matches!(
            accounts.authenticate("alice", "").unwrap_err(),
            Error::InvalidCredentials
        ));
    }

    #[test]
    fn sessions_bind_resolve_and_clear() {
        let accounts = service();
        accounts.provision_user("alice", "hunter22").unwrap();
        let identity = accounts.authenticate("alice", "hunter22").unwrap();

        let token = accounts.login(identity.clone()).unwrap();
        let caller = accounts.current_identity(Some(token)).unwrap();
        assert_eq!(caller.identity().unwrap(), &identity);

        accounts.logout(token).unwrap();
        assert!(!accounts.current_identity(Some(token)).unwrap().is_authenticated());

        // Logging out again, or with a token that never existed, is a no-op.
        accounts.logout(token).unwrap();
        accounts.logout(Uuid::new_v4()).unwrap();
    }

    #[test]
    fn no_token_resolves_anonymous() {
        let accounts = service();
        assert!(!accounts.current_identity(None).unwrap().is_authenticated());
    }

    #[test]
    fn provisioning_rejects_duplicates() {
        let accounts = service();
        accounts.provision_user("alice", "hunter22").unwrap();
        assert!(matches!(
            accounts.provision_user("alice", "other").unwrap_err(),
            Error::UsernameTaken
        ));
    }

    #[test]
    fn set_password_replaces_credential() {
        let accounts = service();
        let user = accounts.provision_user("alice", "oldpass").unwrap();

        accounts.set_password(user.id, "newpass").unwrap();
        assert!(matches!(
            accounts.authenticate("alice", "oldpass").unwrap_err(),
            Error::InvalidCredentials
        ));
        accounts.authenticate("alice", "newpass").unwrap();

        assert!(matches!(
            accounts.set_password(9999, "x").unwrap_err(),
            Error::NotFound
        ));
    }
}
