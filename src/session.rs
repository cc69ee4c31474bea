//! Persisted authentication session.
//!
//! Keeps the signed-in session in a JSON file so the user stays signed in
//! between runs.

use crate::backend::Session;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the persisted session.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the session from file.
    ///
    /// # Returns
    /// * `Result<Option<Session>>` - Stored session, None if signed out, or error
    ///
    /// # Details
    /// If the file doesn't exist, the user is signed out.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))?;

        let session: Session =
            serde_json::from_str(&content).with_context(|| "Failed to parse session file")?;

        Ok(Some(session))
    }

    /// Save the session to file.
    ///
    /// # Details
    /// Creates parent directory if it doesn't exist.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create session directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(session).context("Failed to serialize session")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session file: {}", self.path.display()))?;

        Ok(())
    }

    /// Remove the persisted session. Missing files are fine.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove session file: {}", self.path.display())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::User;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn session() -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user: User {
                id: "user-1".to_string(),
                email: Some("dev@example.com".to_string()),
            },
        }
    }

    #[test]
    fn test_session_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = SessionFile::new(temp_dir.path().join("session.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_session_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = SessionFile::new(temp_dir.path().join("nested").join("session.json"));

        file.save(&session()).unwrap();
        assert!(file.path().exists());

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded, session_with_expiry(&loaded));
        assert_eq!(loaded.user.id, "user-1");
        assert_eq!(loaded.refresh_token, "refresh");
    }

    fn session_with_expiry(loaded: &Session) -> Session {
        Session {
            expires_at: loaded.expires_at,
            ..session()
        }
    }

    #[test]
    fn test_session_clear() {
        let temp_dir = TempDir::new().unwrap();
        let file = SessionFile::new(temp_dir.path().join("session.json"));
        file.save(&session()).unwrap();

        file.clear().unwrap();
        assert!(!file.path().exists());
        assert!(file.load().unwrap().is_none());
        file.clear().unwrap();
    }

    #[test]
    fn test_session_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(SessionFile::new(path).load().is_err());
    }
}
