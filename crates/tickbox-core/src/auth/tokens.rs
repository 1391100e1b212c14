use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Token file name in cache directory
const TOKENS_FILE: &str = "tokens.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub stored_at: DateTime<Utc>,
}

impl Tokens {
    pub fn new(access: String, refresh: Option<String>) -> Self {
        Self {
            access,
            refresh,
            stored_at: Utc::now(),
        }
    }
}

/// Shared, cheaply cloneable token store.
///
/// Every clone sees the same tokens; the adapter and the session store hold
/// clones of one cache.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    tokens: Arc<RwLock<Option<Tokens>>>,
    path: Option<Arc<PathBuf>>,
}

impl TokenCache {
    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A cache mirrored to `tokens.json` under `cache_dir`.
    pub fn persistent(cache_dir: &Path) -> Self {
        Self {
            tokens: Arc::default(),
            path: Some(Arc::new(cache_dir.join(TOKENS_FILE))),
        }
    }

    /// Load tokens from disk. Returns whether a token pair was found.
    pub fn load(&self) -> Result<bool> {
        let Some(path) = self.path.as_deref() else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        let contents = std::fs::read_to_string(path).context("Failed to read token file")?;
        let tokens: Tokens =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        debug!(stored_at = %tokens.stored_at, "Loaded cached tokens");
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
        Ok(true)
    }

    pub fn access(&self) -> Option<String> {
        self.read(|t| t.access.clone())
    }

    pub fn refresh(&self) -> Option<String> {
        self.read(|t| t.refresh.clone()).flatten()
    }

    pub fn get(&self) -> Option<Tokens> {
        self.read(Clone::clone)
    }

    pub fn is_empty(&self) -> bool {
        self.read(|_| ()).is_none()
    }

    /// Replace the token pair and persist it.
    pub fn store(&self, tokens: Tokens) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
        self.persist();
    }

    /// Record a renewed access token. The refresh token is only replaced
    /// when the server rotated it.
    pub fn renew(&self, access: String, rotated_refresh: Option<String>) {
        {
            let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
            let refresh =
                rotated_refresh.or_else(|| guard.as_ref().and_then(|t| t.refresh.clone()));
            *guard = Some(Tokens::new(access, refresh));
        }
        self.persist();
    }

    /// Discard all token material, in memory and on disk.
    pub fn clear(&self) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Some(path) = self.path.as_deref() {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(error = %e, "Failed to remove token file");
                }
            }
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Tokens) -> T) -> Option<T> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to save tokens");
        }
    }

    fn save(&self) -> Result<()> {
        let (Some(path), Some(tokens)) = (self.path.as_deref(), self.get()) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&tokens)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
