use std::rc::Rc;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::token::{DecodedUser, decode_token_payload};

pub const TOKEN_STORAGE_KEY: &str = "token";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session storage is unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read session token: {0}")]
    Read(String),
    #[error("failed to write session token: {0}")]
    Write(String),
}

/// Persistence slot for the single session token.
///
/// Implementations hold at most one token value. Concurrent writers (other
/// tabs sharing browser storage, other processes sharing a session file) race
/// with last-writer-wins semantics.
pub trait SessionStore {
    fn load_token(&self) -> Result<Option<String>, SessionStoreError>;
    fn persist_token(&self, token: &str) -> Result<(), SessionStoreError>;
    fn clear_token(&self) -> Result<(), SessionStoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn load_token(&self) -> Result<Option<String>, SessionStoreError> {
        (**self).load_token()
    }

    fn persist_token(&self, token: &str) -> Result<(), SessionStoreError> {
        (**self).persist_token(token)
    }

    fn clear_token(&self) -> Result<(), SessionStoreError> {
        (**self).clear_token()
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Rc<S> {
    fn load_token(&self) -> Result<Option<String>, SessionStoreError> {
        (**self).load_token()
    }

    fn persist_token(&self, token: &str) -> Result<(), SessionStoreError> {
        (**self).persist_token(token)
    }

    fn clear_token(&self) -> Result<(), SessionStoreError> {
        (**self).clear_token()
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load_token(&self) -> Result<Option<String>, SessionStoreError> {
        let guard = self
            .token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone())
    }

    fn persist_token(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<(), SessionStoreError> {
        let mut guard = self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
        Ok(())
    }
}

/// Explicit session handle passed to the API client and the identity helpers.
///
/// Cloning is cheap when `S` is a shared pointer (`Rc`/`Arc`), which is how
/// hosts share one slot between the client and page code.
#[derive(Debug, Clone)]
pub struct SessionContext<S> {
    store: S,
}

impl<S: SessionStore> SessionContext<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current token, if any. Empty values and unreadable storage both read
    /// as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store.load_token() {
            Ok(token) => token.filter(|value| !value.is_empty()),
            Err(error) => {
                warn!(%error, "session token unreadable; treating as signed out");
                None
            }
        }
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<(), SessionStoreError> {
        self.store.persist_token(token)
    }

    pub fn clear_token(&self) -> Result<(), SessionStoreError> {
        self.store.clear_token()
    }

    /// Decodes the stored token's claims. Fails closed: absent, malformed or
    /// non-object payloads all yield `None`.
    pub fn current_user(&self) -> Option<DecodedUser> {
        let token = self.token()?;
        match decode_token_payload(&token) {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::debug!(%error, "failed to decode session token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJ1c2VyX2lkIjoxLCJyb2xlIjoiQWRtaW4ifQ.sig";

    struct BrokenStore;

    impl SessionStore for BrokenStore {
        fn load_token(&self) -> Result<Option<String>, SessionStoreError> {
            Err(SessionStoreError::Unavailable("storage disabled".to_string()))
        }

        fn persist_token(&self, _token: &str) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::Write("quota exceeded".to_string()))
        }

        fn clear_token(&self) -> Result<(), SessionStoreError> {
            Ok(())
        }
    }

    #[test]
    fn memory_store_holds_a_single_token() {
        let session = SessionContext::new(MemorySessionStore::new());
        assert_eq!(session.token(), None);

        session.set_token("first").expect("persist first");
        session.set_token("second").expect("persist second");
        assert_eq!(session.token().as_deref(), Some("second"));

        session.clear_token().expect("clear");
        assert_eq!(session.token(), None);
    }

    #[test]
    fn empty_token_reads_as_absent() {
        let session = SessionContext::new(MemorySessionStore::with_token(""));
        assert!(!session.has_token());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn unreadable_store_reads_as_signed_out() {
        let session = SessionContext::new(BrokenStore);
        assert_eq!(session.token(), None);
        assert!(session.current_user().is_none());
        assert_eq!(
            session.set_token("abc"),
            Err(SessionStoreError::Write("quota exceeded".to_string()))
        );
    }

    #[test]
    fn current_user_decodes_stored_token() {
        let session = SessionContext::new(MemorySessionStore::with_token(ADMIN_TOKEN));
        let user = session.current_user().expect("decoded user");
        assert_eq!(user.role_claim(), Some("Admin"));
        assert_eq!(user.user_id(), Some(1));
    }

    #[test]
    fn shared_store_is_visible_through_clones() {
        let store = Arc::new(MemorySessionStore::new());
        let page = SessionContext::new(Arc::clone(&store));
        let client = page.clone();

        client.set_token(ADMIN_TOKEN).expect("persist");
        assert_eq!(page.token().as_deref(), Some(ADMIN_TOKEN));
        assert_eq!(
            store.load_token().expect("load").as_deref(),
            Some(ADMIN_TOKEN)
        );
    }
}
