use std::{
    fmt::Debug,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{Result, SearchError};

const SESSION_FILE: &str = "session.json";

/// The signed-in user as stored next to the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default)]
    pub user_id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expiry: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: SessionUser) -> Self {
        self.user = Some(user);
        self
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.user
            .as_ref()
            .and_then(|u| u.expiry)
            .is_some_and(|expiry| expiry <= now)
    }
}

/// Where the bearer token and user record live between runs.
///
/// The HTTP client only talks to storage through this trait.
pub trait SessionStore: Debug + Send + Sync {
    fn load(&self) -> Result<Option<Session>>;

    fn save(&self, session: &Session) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Token of a stored, unexpired session.
    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(Some(session)) if !session.is_expired(OffsetDateTime::now_utc()) => {
                Some(session.token)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                None
            }
        }
    }
}

/// Session persisted as JSON in the user's config directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        let root = dirs::config_dir()
            .ok_or_else(|| SearchError::Session("Cannot determine config directory".to_string()))?
            .join("travel-search");
        Ok(Self::at(root.join(SESSION_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn io_error(action: &str, path: &Path, e: impl std::fmt::Display) -> SearchError {
    SearchError::Session(format!("Failed to {} {}: {}", action, path.display(), e))
}

fn secure_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut file| file.write_all(content.as_bytes()))
            .map_err(|e| io_error("write", path, e))?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content).map_err(|e| io_error("write", path, e))?;
    }

    Ok(())
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw =
            std::fs::read_to_string(&self.path).map_err(|e| io_error("read", &self.path, e))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| io_error("parse", &self.path, e))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string_pretty(session)
            .map_err(|e| SearchError::Session(format!("Failed to encode session: {}", e)))?;
        secure_write(&self.path, &raw)
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| io_error("remove", &self.path, e))?;
        }
        Ok(())
    }
}

/// Session kept in memory, for dev mode and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
