//! API key persistence.
//!
//! The credential file holds a single `KEY=<token>` line. The key is handed
//! back to callers as an [`ApiKey`] value and never placed in the process
//! environment.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::error::{Result, WeatherError};

/// OpenWeather keys are 32 hex characters.
pub const API_KEY_LEN: usize = 32;

const KEY_PREFIX: &str = "KEY";

/// A validated OpenWeather API key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let key = raw.as_ref().trim();
        let actual = key.chars().count();
        if actual != API_KEY_LEN {
            return Err(WeatherError::InvalidApiKey {
                expected: API_KEY_LEN,
                actual,
            });
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the secret out of logs and panic messages.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl TryFrom<&str> for ApiKey {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

/// File-backed store for the API key.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Overwrite the credential file with `KEY=<key>`.
    pub fn save(&self, key: &ApiKey) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WeatherError::io(parent, e))?;
        }

        fs::write(&self.path, format!("{KEY_PREFIX}={}\n", key.as_str()))
            .map_err(|e| WeatherError::io(&self.path, e))?;

        tracing::info!(path = %self.path.display(), "saved API key");
        Ok(())
    }

    pub fn load(&self) -> Result<ApiKey> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| WeatherError::io(&self.path, e))?;

        let value = contents
            .lines()
            .filter_map(|line| line.split_once('='))
            .find(|(name, _)| name.trim() == KEY_PREFIX)
            .map(|(_, value)| value)
            .ok_or_else(|| self.malformed(format!("no `{KEY_PREFIX}=` line found")))?;

        ApiKey::new(value).map_err(|e| self.malformed(e.to_string()))
    }

    fn malformed(&self, reason: String) -> WeatherError {
        WeatherError::MalformedCredentials {
            path: self.path.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY: &str = "abcdefghijklmnopqrstuvwxyz123456";

    fn store() -> (CredentialStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let store = CredentialStore::new(dir.path().join("nested").join("credentials.env"));
        (store, dir)
    }

    #[test]
    fn save_then_load_roundtrip() {
        let (store, _dir) = store();
        assert!(!store.exists());

        store.save(&ApiKey::new(KEY).expect("valid key")).expect("save");

        assert!(store.exists());
        assert_eq!(store.load().expect("load").as_str(), KEY);
    }

    #[test]
    fn save_writes_single_key_line() {
        let (store, _dir) = store();
        store.save(&ApiKey::new(KEY).expect("valid key")).expect("save");

        let contents = fs::read_to_string(store.path()).expect("read");
        assert_eq!(contents, format!("KEY={KEY}\n"));
    }

    #[test]
    fn save_overwrites_previous_key() {
        let (store, _dir) = store();
        store.save(&ApiKey::new(KEY).expect("valid key")).expect("save");

        let other = "0123456789abcdef0123456789abcdef";
        store.save(&ApiKey::new(other).expect("valid key")).expect("save");

        assert_eq!(store.load().expect("load").as_str(), other);
    }

    #[test]
    fn api_key_length_is_enforced() {
        let err = ApiKey::new("short").unwrap_err();
        assert!(matches!(err, WeatherError::InvalidApiKey { expected: 32, actual: 5 }));
        assert!(ApiKey::new(format!("  {KEY}\n")).is_ok());
    }

    #[test]
    fn load_fails_without_key_line() {
        let (store, _dir) = store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), "no equals sign here\n").expect("write");

        let err = store.load().unwrap_err();
        assert!(matches!(err, WeatherError::MalformedCredentials { .. }));
        assert!(err.to_string().contains("no `KEY=` line"));
    }

    #[test]
    fn load_fails_on_wrong_length_value() {
        let (store, _dir) = store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("mkdir");
        fs::write(store.path(), "KEY=tooshort\n").expect("write");

        assert!(matches!(store.load().unwrap_err(), WeatherError::MalformedCredentials { .. }));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let (store, _dir) = store();
        assert!(matches!(store.load().unwrap_err(), WeatherError::Io { .. }));
    }

    #[test]
    fn debug_does_not_leak_key() {
        let key = ApiKey::new(KEY).expect("valid key");
        assert!(!format!("{key:?}").contains(KEY));
    }
}
