//! Persistence for the chat service credential
//!
//! At most one credential exists, stored under [`CREDENTIAL_KEY`]. The value is
//! kept as a [`SecretString`] in memory so it never reaches logs or `Debug`.

use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};

use crate::db::DbPool;
use crate::{Error, Result};

/// Fixed key the credential is stored under
pub const CREDENTIAL_KEY: &str = "OPENAI_API_KEY";

/// Key/value store holding the single API credential
pub trait CredentialStore: Send + Sync {
    /// Retrieve the stored credential, or `None` if not configured
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self) -> Result<Option<SecretString>>;

    /// Insert or replace the credential
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, credential: &SecretString) -> Result<()>;

    /// Erase the credential
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self) -> Result<()>;
}

/// `SQLite`-backed credential store
pub struct SqliteCredentialStore {
    db: DbPool,
}

impl SqliteCredentialStore {
    /// Create a new store backed by the given pool
    #[must_use]
    pub const fn new(db: DbPool) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<crate::db::DbConn> {
        self.db.get().map_err(|e| Error::Database(e.to_string()))
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn get(&self) -> Result<Option<SecretString>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            rusqlite::params![CREDENTIAL_KEY],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(SecretString::from(value))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::Database(e.to_string())),
        }
    }

    fn set(&self, credential: &SecretString) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO settings (key, value, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            rusqlite::params![CREDENTIAL_KEY, credential.expose_secret()],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        tracing::debug!(key = CREDENTIAL_KEY, "credential stored");
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM settings WHERE key = ?1",
            rusqlite::params![CREDENTIAL_KEY],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        tracing::debug!(key = CREDENTIAL_KEY, "credential removed");
        Ok(())
    }
}

/// Process-local credential store
#[derive(Default)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `credential`
    #[must_use]
    pub fn with_credential(credential: &str) -> Self {
        Self {
            value: Mutex::new(Some(credential.to_string())),
        }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.value
            .lock()
            .map_err(|_| Error::Credential("credential store lock poisoned".to_string()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<SecretString>> {
        Ok(self.slot()?.clone().map(SecretString::from))
    }

    fn set(&self, credential: &SecretString) -> Result<()> {
        *self.slot()? = Some(credential.expose_secret().to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_store() -> SqliteCredentialStore {
        SqliteCredentialStore::new(crate::db::init_memory().unwrap())
    }

    #[test]
    fn set_and_get_credential() {
        let store = sqlite_store();
        store.set(&SecretString::from("sk-test")).unwrap();
        let key = store.get().unwrap().unwrap();
        assert_eq!(key.expose_secret(), "sk-test");
    }

    #[test]
    fn set_replaces_previous() {
        let store = sqlite_store();
        store.set(&SecretString::from("sk-old")).unwrap();
        store.set(&SecretString::from("sk-new")).unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose_secret(), "sk-new");
    }

    #[test]
    fn remove_credential() {
        let store = sqlite_store();
        store.set(&SecretString::from("sk-test")).unwrap();
        store.remove().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn remove_when_empty_is_ok() {
        let store = sqlite_store();
        store.remove().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jarvis.db");
        SqliteCredentialStore::new(crate::db::init(&path).unwrap())
            .set(&SecretString::from("sk-persisted"))
            .unwrap();

        let reopened = SqliteCredentialStore::new(crate::db::init(&path).unwrap());
        assert_eq!(
            reopened.get().unwrap().unwrap().expose_secret(),
            "sk-persisted"
        );
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCredentialStore::with_credential("sk-mem");
        assert_eq!(store.get().unwrap().unwrap().expose_secret(), "sk-mem");
        store.remove().unwrap();
        assert!(store.get().unwrap().is_none());
    }
}
