//! Bearer-credential storage.
//!
//! Persists the session token in `<home>/token.json` with restricted
//! permissions (0600). Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::paths;

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// File-backed store for the single bearer credential.
///
/// Reads and writes never fail from the caller's point of view: an
/// unreadable or corrupt file behaves as an empty store, and a failed write
/// is logged and otherwise ignored.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: Arc<PathBuf>,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    /// Store at the default location under the application home.
    pub fn open_default() -> Self {
        Self::new(paths::token_path())
    }

    /// Returns the stored credential, if any.
    pub fn get(&self) -> Option<String> {
        let contents = fs::read_to_string(self.path.as_ref()).ok()?;
        let stored: StoredToken = serde_json::from_str(&contents).ok()?;
        (!stored.token.is_empty()).then_some(stored.token)
    }

    /// Persists `token`, replacing any previous credential.
    pub fn save(&self, token: &str) {
        if let Err(err) = self.write(token) {
            warn!(path = %self.path.display(), error = %err, "failed to persist credential");
        }
    }

    /// Erases the stored credential. No-op when none is stored.
    pub fn clear(&self) {
        match fs::remove_file(self.path.as_ref()) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to clear credential");
            }
        }
    }

    fn write(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&StoredToken {
            token: token.to_string(),
        })
        .map_err(io::Error::other)?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(self.path.as_ref())?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(self.path.as_ref(), contents)?;
        }

        Ok(())
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...", &token[..12])
}
