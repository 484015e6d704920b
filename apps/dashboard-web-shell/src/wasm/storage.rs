use dashboard_client_core::{SessionStore, SessionStoreError};

/// Session token kept in `window.localStorage` under a fixed key.
#[derive(Debug, Clone)]
pub(super) struct LocalStorageSessionStore {
    key: String,
}

impl LocalStorageSessionStore {
    pub(super) fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    fn storage() -> Result<web_sys::Storage, SessionStoreError> {
        let window = web_sys::window()
            .ok_or_else(|| SessionStoreError::Unavailable("window is unavailable".to_string()))?;
        window
            .local_storage()
            .map_err(|_| {
                SessionStoreError::Unavailable("failed to access local storage".to_string())
            })?
            .ok_or_else(|| SessionStoreError::Unavailable("local storage is disabled".to_string()))
    }
}

impl SessionStore for LocalStorageSessionStore {
    fn load_token(&self) -> Result<Option<String>, SessionStoreError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|_| SessionStoreError::Read("failed to read token from local storage".to_string()))
    }

    fn persist_token(&self, token: &str) -> Result<(), SessionStoreError> {
        Self::storage()?
            .set_item(&self.key, token)
            .map_err(|_| SessionStoreError::Write("failed to persist token".to_string()))
    }

    fn clear_token(&self) -> Result<(), SessionStoreError> {
        Self::storage()?
            .remove_item(&self.key)
            .map_err(|_| SessionStoreError::Write("failed to remove token".to_string()))
    }
}
