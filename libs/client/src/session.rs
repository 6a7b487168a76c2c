//! Authenticated session
//!
//! A [`SessionContext`] is an explicit, cloneable handle to the current
//! identity and bearer token. Clones share state, so the gateway, the stores
//! and the route guard all see the same login. The identity is mirrored into
//! a [`SessionStorage`] and restored from it on construction.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::models::User;
use crate::storage::SessionStorage;

const USER_KEY: &str = "user";
const TOKEN_KEY: &str = "token";

#[derive(Debug, Default)]
struct SessionState {
    user: Option<User>,
    token: Option<String>,
}

/// Shared handle to the current session
#[derive(Clone)]
pub struct SessionContext {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionContext {
    /// Create a session, restoring a previous login from `storage`
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let state = Self::restore(storage.as_ref());
        Self {
            state: Arc::new(RwLock::new(state)),
            storage,
        }
    }

    fn restore(storage: &dyn SessionStorage) -> SessionState {
        let (Some(raw_user), Some(token)) = (storage.get(USER_KEY), storage.get(TOKEN_KEY)) else {
            return SessionState::default();
        };

        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) if !token.is_empty() => {
                debug!("Restored session for user {}", user.id);
                SessionState {
                    user: Some(user),
                    token: Some(token),
                }
            }
            Ok(_) => SessionState::default(),
            Err(e) => {
                warn!("Discarding unreadable stored session: {}", e);
                storage.remove(USER_KEY);
                storage.remove(TOKEN_KEY);
                SessionState::default()
            }
        }
    }

    /// Become authenticated and persist the identity
    pub fn login(&self, user: User, token: String) {
        match serde_json::to_string(&user) {
            Ok(raw) => {
                self.storage.set(USER_KEY, raw);
                self.storage.set(TOKEN_KEY, token.clone());
            }
            Err(e) => warn!("Failed to persist session: {}", e),
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.user = Some(user);
        state.token = Some(token);
    }

    /// Replace the stored profile, keeping the token
    pub fn update_user(&self, user: User) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.token.is_none() {
            return;
        }
        if let Ok(raw) = serde_json::to_string(&user) {
            self.storage.set(USER_KEY, raw);
        }
        state.user = Some(user);
    }

    /// Become anonymous and clear storage
    pub fn logout(&self) {
        self.storage.remove(USER_KEY);
        self.storage.remove(TOKEN_KEY);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.user = None;
        state.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Id of the logged-in user
    pub fn user_id(&self) -> Option<i64> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .as_ref()
            .map(|user| user.id)
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn ava() -> User {
        User {
            id: 1,
            name: "Ava".to_string(),
            email: "ava@x.com".to_string(),
        }
    }

    #[test]
    fn test_starts_anonymous() {
        let session = SessionContext::new(Arc::new(MemoryStorage::default()));
        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
        assert_eq!(session.token(), None);
    }

    #[test]
    fn test_login_persists_and_clones_share_state() {
        let storage = Arc::new(MemoryStorage::default());
        let session = SessionContext::new(storage.clone());
        let other_handle = session.clone();

        session.login(ava(), "token-1".to_string());

        assert!(other_handle.is_authenticated());
        assert_eq!(other_handle.user_id(), Some(1));
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("token-1"));
    }

    #[test]
    fn test_restores_from_storage() {
        let storage = Arc::new(MemoryStorage::default());
        SessionContext::new(storage.clone()).login(ava(), "token-1".to_string());

        let restored = SessionContext::new(storage);
        assert_eq!(restored.user(), Some(ava()));
        assert_eq!(restored.token().as_deref(), Some("token-1"));
    }

    #[test]
    fn test_logout_clears_storage() {
        let storage = Arc::new(MemoryStorage::default());
        let session = SessionContext::new(storage.clone());
        session.login(ava(), "token-1".to_string());

        session.logout();

        assert!(!session.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_corrupt_storage_is_discarded() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set(USER_KEY, "{not json".to_string());
        storage.set(TOKEN_KEY, "token-1".to_string());

        let session = SessionContext::new(storage.clone());
        assert!(!session.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_update_user_requires_login() {
        let session = SessionContext::new(Arc::new(MemoryStorage::default()));
        session.update_user(ava());
        assert_eq!(session.user(), None);

        session.login(ava(), "token-1".to_string());
        let mut renamed = ava();
        renamed.name = "Ava B".to_string();
        session.update_user(renamed.clone());
        assert_eq!(session.user(), Some(renamed));
        assert_eq!(session.token().as_deref(), Some("token-1"));
    }
}
