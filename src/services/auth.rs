//! Login gate
//!
//! A single configured username/password pair. The session survives between
//! invocations through the persisted `authState` dataset.

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::{AsedexError, AsedexResult};
use crate::models::AuthState;
use crate::storage::Storage;

/// Service for the login session
pub struct AuthService<'a> {
    storage: &'a Storage,
    settings: &'a Settings,
}

impl<'a> AuthService<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self { storage, settings }
    }

    /// Check credentials and open a session; returns whether they matched
    pub fn login(&self, username: &str, password: &str) -> AsedexResult<bool> {
        let username = username.trim();
        if username != self.settings.admin_username || password != self.settings.admin_password {
            warn!(key = "authState", operation = "login", username, "rejected credentials");
            return Ok(false);
        }

        self.storage.auth.set(AuthState::logged_in(username))?;
        info!(key = "authState", operation = "login", username, "logged in");
        Ok(true)
    }

    /// Close the session
    pub fn logout(&self) -> AsedexResult<()> {
        self.storage.auth.set(AuthState::default())?;
        info!(key = "authState", operation = "logout", "logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> AsedexResult<bool> {
        self.storage.auth.with(|state| state.is_authenticated)
    }

    /// The logged-in user, if any
    pub fn current_user(&self) -> AsedexResult<Option<String>> {
        self.storage.auth.with(|state| {
            if state.is_authenticated {
                state.username.clone()
            } else {
                None
            }
        })
    }

    pub fn state(&self) -> AsedexResult<AuthState> {
        self.storage.auth.get()
    }

    /// Fail unless a session is open (or login is not required)
    pub fn require(&self) -> AsedexResult<()> {
        if !self.settings.require_login || self.is_authenticated()? {
            Ok(())
        } else {
            Err(AsedexError::Auth(
                "Not logged in. Run 'asedex login' first.".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AsedexPaths;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = AsedexPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths, &Settings::default()).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_login_with_default_credentials() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let auth = AuthService::new(&storage, &settings);

        assert!(!auth.is_authenticated().unwrap());
        assert!(auth.login("admin", "1234").unwrap());
        assert!(auth.is_authenticated().unwrap());
        assert_eq!(auth.current_user().unwrap().as_deref(), Some("admin"));
        assert!(auth.state().unwrap().logged_in_at.is_some());
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let auth = AuthService::new(&storage, &settings);

        assert!(!auth.login("admin", "nope").unwrap());
        assert!(!auth.is_authenticated().unwrap());
        assert!(matches!(auth.require(), Err(AsedexError::Auth(_))));
    }

    #[test]
    fn test_logout() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let auth = AuthService::new(&storage, &settings);

        auth.login("admin", "1234").unwrap();
        auth.logout().unwrap();
        assert!(!auth.is_authenticated().unwrap());
        assert!(auth.current_user().unwrap().is_none());
    }

    #[test]
    fn test_session_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AsedexPaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings::default();

        {
            let storage = Storage::new(paths.clone(), &settings).unwrap();
            AuthService::new(&storage, &settings).login("admin", "1234").unwrap();
        }

        let storage = Storage::new(paths, &settings).unwrap();
        assert!(AuthService::new(&storage, &settings).require().is_ok());

        let raw = std::fs::read_to_string(temp_dir.path().join("data/auth/authState.json")).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(raw["version"], 0);
        assert_eq!(raw["authState"]["isAuthenticated"], true);
    }

    #[test]
    fn test_require_when_login_disabled() {
        let (_temp_dir, storage) = create_test_storage();
        let settings = Settings {
            require_login: false,
            ..Settings::default()
        };
        assert!(AuthService::new(&storage, &settings).require().is_ok());
    }
}
