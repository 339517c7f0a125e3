use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::access::Role;
use crate::{ConsoleError, Result};

const PROFILE_KEY: &str = "current_user";

/// The non-sensitive part of a session that survives a restart.
/// The token is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Durable store for the single remembered user record
pub struct ProfileStore {
    store: Keyspace,
}

fn storage_error(e: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::storage(e.to_string())
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(storage_error)?
        .as_secs())
}

impl ProfileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open().map_err(storage_error)?;
        let items = db
            .keyspace("profile", fjall::KeyspaceCreateOptions::default)
            .map_err(storage_error)?;
        Ok(ProfileStore { store: items })
    }

    /// Stores the profile with a time-to-live (TTL).
    #[tracing::instrument(name = "save_profile", level = "debug", skip(self))]
    pub fn save(&self, profile: &StoredProfile, ttl: Duration) -> Result<()> {
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or_else(|| ConsoleError::storage("TTL overflow"))?
            .duration_since(UNIX_EPOCH)
            .map_err(storage_error)?
            .as_secs();
        let entry = StoredEntry {
            value: profile,
            expires_at,
        };
        let bytes = postcard::to_stdvec(&entry).map_err(storage_error)?;
        self.store
            .insert(PROFILE_KEY.as_bytes(), bytes)
            .map_err(storage_error)?;
        Ok(())
    }

    /// Returns the profile if one exists and has not expired.
    /// Expired entries are removed on read.
    #[tracing::instrument(name = "load_profile", level = "debug", skip(self))]
    pub fn load(&self) -> Result<Option<StoredProfile>> {
        let Some(bytes) = self.store.get(PROFILE_KEY.as_bytes()).map_err(storage_error)? else {
            tracing::debug!("No remembered profile");
            return Ok(None);
        };

        let entry: StoredEntry<StoredProfile> =
            postcard::from_bytes(&bytes).map_err(storage_error)?;

        if now_secs()? < entry.expires_at {
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Remembered profile expired");
            self.clear()?;
            Ok(None)
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(PROFILE_KEY.as_bytes()).map_err(storage_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile() -> StoredProfile {
        StoredProfile {
            username: "agency".to_string(),
            display_name: "Agency Desk".to_string(),
            role: Role::Agency,
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path()).unwrap();

        assert_eq!(store.load().unwrap(), None);
        store.save(&profile(), Duration::from_secs(3600)).unwrap();
        assert_eq!(store.load().unwrap(), Some(profile()));
    }

    #[test]
    fn test_expired_profile_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path()).unwrap();

        store.save(&profile(), Duration::ZERO).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::open(dir.path()).unwrap();

        store.save(&profile(), Duration::from_secs(3600)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
