//! Persisted authentication session.
//!
//! Mirrors what the browser build keeps in local storage: the basic-auth
//! token, the signed-in user, the current nonce and when it was last
//! refreshed. Everything is stored through a [`KeyValueStore`], so the same
//! session survives process restarts when backed by a [`crate::FileStore`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::store::{KeyValueStore, StoreError};
use crate::users::CurrentUser;

const KEY_TOKEN: &str = "auth_token";
const KEY_USER: &str = "user";
const KEY_NONCE: &str = "nonce";
const KEY_LAST_REFRESH: &str = "last_nonce_refresh";

/// Handle to the persisted session. Cheap to clone; clones share the store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Record a successful login.
    pub fn login(&self, token: &str, user: &CurrentUser) -> Result<(), StoreError> {
        self.set_token(token)?;
        self.set_user(user)
    }

    /// Forget credentials, user and nonce.
    pub fn logout(&self) -> Result<(), StoreError> {
        for key in [KEY_TOKEN, KEY_USER, KEY_NONCE, KEY_LAST_REFRESH] {
            self.kv.remove(key)?;
        }
        tracing::info!("session cleared");
        Ok(())
    }

    /// A session is authenticated once it holds a token.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.kv.get(KEY_TOKEN), Ok(Some(t)) if !t.is_empty())
    }

    pub fn token(&self) -> Result<Option<Zeroizing<String>>, StoreError> {
        Ok(self
            .kv
            .get(KEY_TOKEN)?
            .filter(|t| !t.is_empty())
            .map(Zeroizing::new))
    }

    pub fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.kv.set(KEY_TOKEN, token)
    }

    pub fn user(&self) -> Result<Option<CurrentUser>, StoreError> {
        self.kv
            .get(KEY_USER)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| StoreError::Malformed {
                    key: KEY_USER.into(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    pub fn set_user(&self, user: &CurrentUser) -> Result<(), StoreError> {
        let raw = serde_json::to_string(user).map_err(|e| StoreError::Malformed {
            key: KEY_USER.into(),
            reason: e.to_string(),
        })?;
        self.kv.set(KEY_USER, &raw)
    }

    pub fn nonce(&self) -> Result<Option<String>, StoreError> {
        Ok(self.kv.get(KEY_NONCE)?.filter(|n| !n.is_empty()))
    }

    /// Store a freshly issued nonce along with when it was obtained.
    pub fn set_nonce(&self, nonce: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.kv.set(KEY_NONCE, nonce)?;
        self.kv.set(KEY_LAST_REFRESH, &at.to_rfc3339())
    }

    pub fn last_refresh(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.kv
            .get(KEY_LAST_REFRESH)?
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| StoreError::Malformed {
                        key: KEY_LAST_REFRESH.into(),
                        reason: e.to_string(),
                    })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use desk_core::{Capabilities, UserId};

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId(3),
            name: "Noura".into(),
            email: Some("noura@office.example".into()),
            roles: vec!["accountant".into()],
            capabilities: Capabilities::new(["view_invoices"]),
            avatar_url: None,
        }
    }

    #[test]
    fn login_then_logout() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        assert!(!session.is_authenticated());

        session.login("dG9rZW4=", &user()).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().unwrap().as_str(), "dG9rZW4=");
        assert_eq!(session.user().unwrap().unwrap().name, "Noura");

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.user().unwrap().is_none());
        assert!(session.nonce().unwrap().is_none());
    }

    #[test]
    fn nonce_records_refresh_time() {
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 8, 30, 0).unwrap();
        session.set_nonce("n-1", at).unwrap();
        assert_eq!(session.nonce().unwrap().as_deref(), Some("n-1"));
        assert_eq!(session.last_refresh().unwrap(), Some(at));
    }

    #[test]
    fn malformed_timestamp_is_reported() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(KEY_LAST_REFRESH, "yesterday").unwrap();
        let session = SessionStore::new(kv);
        assert!(matches!(
            session.last_refresh(),
            Err(StoreError::Malformed { .. })
        ));
    }
}
