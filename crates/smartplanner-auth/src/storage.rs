use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed key the Google token is stored under.
pub const GOOGLE_TOKEN_KEY: &str = "google-token";

/// Access token plus absolute expiry, as persisted by the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token for API requests
    pub access_token: String,

    /// Expiry as Unix epoch milliseconds
    pub expires_at: i64,

    /// Scopes granted to this token
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Build a token from an `expires_in` (seconds) relative to now.
    pub fn from_expires_in(access_token: impl Into<String>, expires_in_secs: u64, scopes: Vec<String>) -> Self {
        let expires_in_ms = i64::try_from(expires_in_secs)
            .unwrap_or(i64::MAX / 1000)
            .saturating_mul(1000);
        Self {
            access_token: access_token.into(),
            expires_at: Utc::now().timestamp_millis().saturating_add(expires_in_ms),
            scopes,
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now().timestamp_millis()
    }

    /// Expiry as a UTC timestamp, if representable
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires_at)
    }
}

/// Storage for the signed-in user's token.
///
/// Stands in for the browser's session storage: the sign-in flow writes it,
/// sign-out and a 401 from the calendar clear it, everything else only reads.
pub trait TokenStore: Send + Sync {
    /// Stored token, or `None` when absent or unreadable
    fn load(&self) -> Option<TokenSet>;

    fn save(&self, token: &TokenSet) -> Result<()>;

    fn clear(&self) -> Result<()>;

    /// Token present and not expired
    fn is_authenticated(&self) -> bool {
        self.load().map(|t| !t.is_expired()).unwrap_or(false)
    }
}

/// File-backed token store: one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token under `<dir>/<key>.json`
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Default location in the user's config directory
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("smartplanner")
            .join("tokens");
        Ok(Self::new(dir, GOOGLE_TOKEN_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<TokenSet> {
        let json = fs::read_to_string(&self.path).context("Failed to read token file")?;
        serde_json::from_str(&json).context("Failed to deserialize token set")
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<TokenSet> {
        if !self.path.exists() {
            return None;
        }
        match self.read() {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("Ignoring unreadable token at {:?}: {:#}", self.path, e);
                None
            }
        }
    }

    fn save(&self, token: &TokenSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create tokens directory")?;
        }

        let json = serde_json::to_string_pretty(token).context("Failed to serialize token set")?;
        fs::write(&self.path, json).context("Failed to write token file")?;

        tracing::info!("Stored token at {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete token file")?;
            tracing::info!("Deleted token at {:?}", self.path);
        }
        Ok(())
    }
}

/// Process-lifetime token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<TokenSet>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: TokenSet) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<TokenSet> {
        self.token.lock().clone()
    }

    fn save(&self, token: &TokenSet) -> Result<()> {
        *self.token.lock() = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock() = None;
        Ok(())
    }
}
