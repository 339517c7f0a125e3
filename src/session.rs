//! Session lifecycle
//!
//! `Anonymous → Authenticating → Authenticated → Anonymous`. The store is an
//! explicit object shared by reference with everything that issues requests.
//! Each transition happens under a single write lock; readers get a cloned
//! snapshot.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::access::Role;
use crate::profile_store::{ProfileStore, StoredProfile};
use crate::{ConsoleError, Result};

/// A signed-in user. The token lives in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub role: Role,
    pub username: String,
    pub display_name: String,
    token: Option<String>,
}

impl Session {
    pub fn new(role: Role, token: Option<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            role,
            username: display_name.clone(),
            display_name,
            token,
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    #[must_use]
    pub fn profile(&self) -> StoredProfile {
        StoredProfile {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            role: self.role.clone(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

pub struct SessionStore {
    state: RwLock<SessionState>,
    profiles: Option<ProfileStore>,
    profile_ttl: Duration,
}

impl SessionStore {
    /// A store that keeps nothing beyond the process lifetime
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(SessionState::Anonymous),
            profiles: None,
            profile_ttl: Duration::ZERO,
        }
    }

    /// A store that remembers the non-sensitive profile fields on disk
    #[must_use]
    pub fn with_profile_store(profiles: ProfileStore, profile_ttl: Duration) -> Self {
        Self {
            state: RwLock::new(SessionState::Anonymous),
            profiles: Some(profiles),
            profile_ttl,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.read().clone()
    }

    /// Snapshot of the signed-in session, if any
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        match &*self.read() {
            SessionState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.read(), SessionState::Authenticated(_))
    }

    /// `Anonymous | Authenticated → Authenticating`
    pub fn begin_login(&self) -> Result<()> {
        let mut state = self.write();
        if *state == SessionState::Authenticating {
            return Err(ConsoleError::validation("A login is already in progress"));
        }
        *state = SessionState::Authenticating;
        debug!("Session state: authenticating");
        Ok(())
    }

    /// `Authenticating → Authenticated`; remembers the profile without the token
    #[instrument(skip(self), fields(role = %session.role))]
    pub fn complete_login(&self, session: Session) -> Result<()> {
        {
            let mut state = self.write();
            if *state != SessionState::Authenticating {
                return Err(ConsoleError::validation("No login in progress"));
            }
            *state = SessionState::Authenticated(session.clone());
        }
        info!("Signed in as {} ({})", session.display_name, session.role);

        if let Some(profiles) = &self.profiles {
            if let Err(e) = profiles.save(&session.profile(), self.profile_ttl) {
                warn!("Failed to remember profile: {}", e);
            }
        }
        Ok(())
    }

    /// `Authenticating → Anonymous`
    pub fn fail_login(&self) {
        let mut state = self.write();
        if *state == SessionState::Authenticating {
            *state = SessionState::Anonymous;
        }
        debug!("Session state: anonymous (login failed)");
    }

    /// Clears the in-memory session and the remembered profile. Never fails.
    pub fn logout(&self) {
        *self.write() = SessionState::Anonymous;
        if let Some(profiles) = &self.profiles {
            if let Err(e) = profiles.clear() {
                warn!("Failed to clear remembered profile: {}", e);
            }
        }
        info!("Signed out");
    }

    /// Drops the in-memory session after the backend rejected its token.
    /// The remembered profile is kept so the user can be prompted to sign in again.
    pub fn invalidate(&self, reason: &str) {
        let mut state = self.write();
        if matches!(*state, SessionState::Authenticated(_)) {
            warn!("Session invalidated: {}", reason);
            *state = SessionState::Anonymous;
        }
    }

    /// The profile remembered from a previous sign-in
    #[must_use]
    pub fn remembered_profile(&self) -> Option<StoredProfile> {
        let profiles = self.profiles.as_ref()?;
        match profiles.load() {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Failed to read remembered profile: {}", e);
                None
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn agency() -> Session {
        Session::new(Role::Agency, Some("secret-token".to_string()), "Agency Desk")
            .with_username("agency")
    }

    #[test]
    fn test_login_transitions() {
        let store = SessionStore::in_memory();
        assert_eq!(store.state(), SessionState::Anonymous);

        store.begin_login().unwrap();
        assert_eq!(store.state(), SessionState::Authenticating);
        assert!(store.begin_login().is_err());

        store.complete_login(agency()).unwrap();
        assert_eq!(store.current(), Some(agency()));
        assert!(store.is_authenticated());

        store.logout();
        assert_eq!(store.state(), SessionState::Anonymous);
        assert_eq!(store.current(), None);
    }

    #[test]
    fn test_failed_login_returns_to_anonymous() {
        let store = SessionStore::in_memory();
        store.begin_login().unwrap();
        store.fail_login();
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_complete_without_begin_is_rejected() {
        let store = SessionStore::in_memory();
        assert!(store.complete_login(agency()).is_err());
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_logout_is_unconditional() {
        let store = SessionStore::in_memory();
        store.logout();
        store.logout();
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_profile_persists_without_token() {
        let dir = TempDir::new().unwrap();
        let profiles = ProfileStore::open(dir.path()).unwrap();
        let store = SessionStore::with_profile_store(profiles, Duration::from_secs(3600));

        store.begin_login().unwrap();
        store.complete_login(agency()).unwrap();

        let remembered = store.remembered_profile().unwrap();
        assert_eq!(remembered.username, "agency");
        assert_eq!(remembered.role, Role::Agency);
        let bytes = postcard::to_stdvec(&remembered).unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("secret-token"));

        store.logout();
        assert_eq!(store.remembered_profile(), None);
    }

    #[test]
    fn test_invalidate_keeps_remembered_profile() {
        let dir = TempDir::new().unwrap();
        let profiles = ProfileStore::open(dir.path()).unwrap();
        let store = SessionStore::with_profile_store(profiles, Duration::from_secs(3600));

        store.begin_login().unwrap();
        store.complete_login(agency()).unwrap();
        store.invalidate("HTTP 401");

        assert_eq!(store.current(), None);
        assert!(store.remembered_profile().is_some());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", agency());
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
