use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::kv::{DiskKv, KEY_USER_DATA, KEY_USER_TOKEN};

/// A restored sign-in: the raw session token plus the public user payload
/// that was stored alongside it.
pub struct StoredSession<U> {
    pub token: String,
    pub user: U,
}

/// Persists the signed-in session across app restarts. The token is opaque
/// here; expiry is the server's concern on next use.
pub struct SessionStore {
    kv: DiskKv,
}

impl SessionStore {
    pub fn new(kv: DiskKv) -> Self {
        Self { kv }
    }

    /// Restores a session only when both the token and the user payload are
    /// present and readable; anything less means signed out.
    pub fn load<U: DeserializeOwned>(&self) -> Option<StoredSession<U>> {
        let token = self.kv.get(KEY_USER_TOKEN)?;
        let raw = self.kv.get(KEY_USER_DATA)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(StoredSession { token, user }),
            Err(e) => {
                warn!(error = %e, "stored user payload unreadable");
                None
            }
        }
    }

    pub fn store<U: Serialize>(&self, token: &str, user: &U) -> anyhow::Result<()> {
        self.kv.set(KEY_USER_TOKEN, token)?;
        self.kv.set(KEY_USER_DATA, &serde_json::to_string(user)?)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.kv.remove(KEY_USER_TOKEN)?;
        self.kv.remove(KEY_USER_DATA)
    }
}
