//! Session storage
//!
//! The session is a flat key/value record (`token`, `role`, `username`,
//! `student_id`, `teacher_id`). The API client receives a store at
//! construction time; the console persists it to a JSON file, tests use the
//! in-memory store.

use async_trait::async_trait;
use campus_core::{CampusError, CampusResult, EntityId, ErrorContext, Role, Session};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Fixed key names under which the session is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    Token,
    Role,
    Username,
    StudentId,
    TeacherId,
}

impl SessionKey {
    pub const ALL: [SessionKey; 5] = [
        SessionKey::Token,
        SessionKey::Role,
        SessionKey::Username,
        SessionKey::StudentId,
        SessionKey::TeacherId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::Token => "token",
            SessionKey::Role => "role",
            SessionKey::Username => "username",
            SessionKey::StudentId => "student_id",
            SessionKey::TeacherId => "teacher_id",
        }
    }
}

/// Credentials carried by an authentication response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    pub token: String,
    pub role: Option<String>,
    pub username: Option<String>,
    pub student_id: Option<String>,
    pub teacher_id: Option<String>,
}

impl AuthCredentials {
    /// Read credentials from a response body. Returns `None` when the body
    /// carries no usable `token`.
    pub fn from_body(body: &Value) -> Option<Self> {
        let token = scalar_text(body.get("token")?)?;

        Some(Self {
            token,
            role: body.get("role").and_then(scalar_text),
            username: body.get("username").and_then(scalar_text),
            student_id: body.get("student_id").and_then(scalar_text),
            teacher_id: body.get("teacher_id").and_then(scalar_text),
        })
    }
}

/// Strings and numbers are kept as text; null, empty strings and
/// structured values count as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Key/value persistence for the session
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: SessionKey) -> CampusResult<Option<String>>;

    async fn set(&self, key: SessionKey, value: &str) -> CampusResult<()>;

    async fn remove(&self, key: SessionKey) -> CampusResult<()>;

    async fn token(&self) -> CampusResult<Option<String>> {
        self.get(SessionKey::Token).await
    }

    /// Record an authentication event. Token, role and username are always
    /// written; identifiers the response did not supply are removed so that a
    /// previous principal's identifier cannot survive a new login.
    async fn save_auth(&self, credentials: &AuthCredentials) -> CampusResult<()> {
        self.set(SessionKey::Token, &credentials.token).await?;

        let optional = [
            (SessionKey::Role, &credentials.role),
            (SessionKey::Username, &credentials.username),
            (SessionKey::StudentId, &credentials.student_id),
            (SessionKey::TeacherId, &credentials.teacher_id),
        ];
        for (key, value) in optional {
            match value {
                Some(value) => self.set(key, value).await?,
                None => self.remove(key).await?,
            }
        }

        debug!(username = ?credentials.username, role = ?credentials.role, "Session updated");
        Ok(())
    }

    /// Read the whole session. Malformed role or identifier values are
    /// logged and treated as absent.
    async fn load(&self) -> CampusResult<Session> {
        let role = match self.get(SessionKey::Role).await? {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    warn!(value = %raw, error = %e, "Ignoring malformed stored role");
                    None
                }
            },
            None => None,
        };

        Ok(Session {
            token: self.get(SessionKey::Token).await?,
            role,
            username: self.get(SessionKey::Username).await?,
            student_id: parse_id(SessionKey::StudentId, self.get(SessionKey::StudentId).await?),
            teacher_id: parse_id(SessionKey::TeacherId, self.get(SessionKey::TeacherId).await?),
        })
    }

    async fn clear(&self) -> CampusResult<()> {
        for key in SessionKey::ALL {
            self.remove(key).await?;
        }
        Ok(())
    }
}

fn parse_id(key: SessionKey, raw: Option<String>) -> Option<EntityId> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!(key = key.as_str(), value = %raw, "Ignoring malformed stored identifier");
            None
        }
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> CampusError {
        CampusError::Session {
            message: "session lock poisoned".to_string(),
            source: None,
            context: ErrorContext::new("memory_session_store"),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: SessionKey) -> CampusResult<Option<String>> {
        let values = self.values.read().map_err(|_| Self::poisoned())?;
        Ok(values.get(&key).cloned())
    }

    async fn set(&self, key: SessionKey, value: &str) -> CampusResult<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: SessionKey) -> CampusResult<()> {
        let mut values = self.values.write().map_err(|_| Self::poisoned())?;
        values.remove(&key);
        Ok(())
    }
}

/// Store persisted as a JSON object keyed by the fixed session key names
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn session_error(
        &self,
        operation: &str,
        message: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> CampusError {
        CampusError::Session {
            message,
            source: Some(source),
            context: ErrorContext::new("file_session_store")
                .with_operation(operation)
                .with_metadata("path", &self.path.display().to_string())
                .with_suggestion("Run 'campus session clear' to reset a corrupted session file"),
        }
    }

    async fn read_all(&self) -> CampusResult<BTreeMap<String, String>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(self.session_error(
                    "read",
                    format!("Failed to read session file: {}", e),
                    Box::new(e),
                ))
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            self.session_error(
                "parse",
                format!("Session file is not valid JSON: {}", e),
                Box::new(e),
            )
        })
    }

    async fn write_all(&self, values: &BTreeMap<String, String>) -> CampusResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    self.session_error(
                        "create_dir",
                        format!("Failed to create session directory: {}", e),
                        Box::new(e),
                    )
                })?;
            }
        }

        let json = serde_json::to_string_pretty(values)?;
        let staging = self.path.with_extension("json.tmp");
        let written = async {
            // A stale staging file would keep its old mode through `truncate`.
            let _ = tokio::fs::remove_file(&staging).await;
            let mut file = open_private(&staging).await?;
            file.write_all(json.as_bytes()).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&staging, &self.path).await
        }
        .await;

        written.map_err(|e| {
            let _ = std::fs::remove_file(&staging);
            self.session_error(
                "write",
                format!("Failed to write session file: {}", e),
                Box::new(e),
            )
        })
    }

    async fn update<F>(&self, apply: F) -> CampusResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut values = self.read_all().await?;
        apply(&mut values);
        self.write_all(&values).await
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: SessionKey) -> CampusResult<Option<String>> {
        Ok(self.read_all().await?.remove(key.as_str()))
    }

    async fn set(&self, key: SessionKey, value: &str) -> CampusResult<()> {
        let value = value.to_string();
        self.update(move |values| {
            values.insert(key.as_str().to_string(), value);
        })
        .await
    }

    async fn remove(&self, key: SessionKey) -> CampusResult<()> {
        self.update(move |values| {
            values.remove(key.as_str());
        })
        .await
    }

    /// One read-modify-write, so a failure cannot leave a new token next to
    /// the previous principal's identifiers.
    async fn save_auth(&self, credentials: &AuthCredentials) -> CampusResult<()> {
        let credentials_for_write = credentials.clone();
        self.update(move |values| {
            let AuthCredentials {
                token,
                role,
                username,
                student_id,
                teacher_id,
            } = credentials_for_write;

            values.insert(SessionKey::Token.as_str().to_string(), token);
            let optional = [
                (SessionKey::Role, role),
                (SessionKey::Username, username),
                (SessionKey::StudentId, student_id),
                (SessionKey::TeacherId, teacher_id),
            ];
            for (key, value) in optional {
                match value {
                    Some(value) => {
                        values.insert(key.as_str().to_string(), value);
                    }
                    None => {
                        values.remove(key.as_str());
                    }
                }
            }
        })
        .await?;

        debug!(username = ?credentials.username, role = ?credentials.role, "Session updated");
        Ok(())
    }
}

/// Session files hold a bearer token; only the owner may read them.
#[cfg(unix)]
async fn open_private(path: &Path) -> std::io::Result<tokio::fs::File> {
    tokio::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .await
}

#[cfg(not(unix))]
async fn open_private(path: &Path) -> std::io::Result<tokio::fs::File> {
    tokio::fs::File::create(path).await
}
