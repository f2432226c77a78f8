//! Persisted client session.
//!
//! The only state kept between runs is the bearer token and a small profile blob used for
//! display. Both live in one JSON file whose path comes from [`crate::config::ClientConfig`].
//! The session is loaded once at startup and passed to whatever needs it.

use crate::{CoreError, CoreResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Display profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PerfilUsuario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionFile {
    #[serde(default)]
    auth_token: Option<String>,
    #[serde(default)]
    user: Option<PerfilUsuario>,
}

/// Session state bound to a file on disk.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    path: PathBuf,
    token: Option<String>,
    perfil: Option<PerfilUsuario>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("perfil", &self.perfil)
            .finish()
    }
}

impl Session {
    /// An empty session that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            token: None,
            perfil: None,
        }
    }

    /// Loads the session from `path`. A missing file yields an empty session.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SessionRead` on I/O failure and `CoreError::SessionFormat` if the
    /// file is not a valid session document.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no session file at {}", path.display());
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(CoreError::SessionRead(e)),
        };

        let mut deserializer = serde_json::Deserializer::from_str(&text);
        let file: SessionFile = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| CoreError::SessionFormat(format!("{} at {}", err.inner(), err.path())))?;

        Ok(Self {
            path: path.to_path_buf(),
            token: file.auth_token.filter(|t| !t.trim().is_empty()),
            perfil: file.user,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn perfil(&self) -> Option<&PerfilUsuario> {
        self.perfil.as_ref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replaces the token and profile and writes the file.
    pub fn sign_in(&mut self, token: String, perfil: Option<PerfilUsuario>) -> CoreResult<()> {
        self.token = Some(token);
        self.perfil = perfil;
        self.save()
    }

    /// Writes the session atomically (temporary file then rename).
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SessionWrite` if the directory or file cannot be written.
    pub fn save(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CoreError::SessionWrite)?;
        }

        let file = SessionFile {
            auth_token: self.token.clone(),
            user: self.perfil.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CoreError::SessionFormat(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(CoreError::SessionWrite)?;
        fs::rename(&tmp, &self.path).map_err(CoreError::SessionWrite)?;
        Ok(())
    }

    /// Forgets the token and profile and removes the file.
    ///
    /// Called on logout and whenever the server answers `401`.
    pub fn clear(&mut self) -> CoreResult<()> {
        self.token = None;
        self.perfil = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::SessionWrite(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_session() {
        let temp = TempDir::new().unwrap();
        let session = Session::load(&temp.path().join("session.json")).unwrap();
        assert!(!session.is_authenticated());
        assert!(session.perfil().is_none());
    }

    #[test]
    fn test_round_trip_through_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("session.json");

        let mut session = Session::empty(&path);
        let perfil = PerfilUsuario {
            nombre: Some("Dra. Ruiz".into()),
            email: None,
            rol: Some("medico".into()),
        };
        session.sign_in("abc123".into(), Some(perfil.clone())).unwrap();

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded.token(), Some("abc123"));
        assert_eq!(loaded.perfil(), Some(&perfil));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_clear_removes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        let mut session = Session::empty(&path);
        session.sign_in("abc".into(), None).unwrap();
        assert!(path.exists());

        session.clear().unwrap();
        assert!(!path.exists());
        assert!(!session.is_authenticated());
        // Clearing twice is fine.
        session.clear().unwrap();
    }

    #[test]
    fn test_invalid_file_reports_format_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(&path, r#"{"auth_token": 42}"#).unwrap();

        let err = Session::load(&path).expect_err("token must be a string");
        assert!(matches!(err, CoreError::SessionFormat(msg) if msg.contains("auth_token")));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        fs::write(&path, r#"{"auth_token": "  "}"#).unwrap();

        let session = Session::load(&path).unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_debug_hides_token() {
        let mut session = Session::empty("unused.json");
        session.token = Some("secret-token".into());
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
