// src/profile.rs
//! User profile data and the key-value store it lives in.
//!
//! The store only ever holds the seven category keys. Two backends:
//! an in-memory map and a JSON file (the browser's local storage equivalent).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::category::FieldCategory;
use crate::error::{FillerError, FillerResult, ValidationError};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Profile values keyed by category. Serialized as a flat camelCase object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    values: BTreeMap<FieldCategory, String>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: FieldCategory, value: &str) -> Self {
        self.set(category, value);
        self
    }

    pub fn set(&mut self, category: FieldCategory, value: &str) {
        self.values.insert(category, value.to_string());
    }

    /// Raw stored value, possibly blank.
    pub fn get(&self, category: FieldCategory) -> Option<&str> {
        self.values.get(&category).map(String::as_str)
    }

    /// Value usable for filling: present and not blank.
    pub fn value_for(&self, category: FieldCategory) -> Option<&str> {
        self.get(category).filter(|v| !v.trim().is_empty())
    }

    pub fn has_data(&self) -> bool {
        FieldCategory::ALL
            .into_iter()
            .any(|c| self.value_for(c).is_some())
    }

    /// Copy with every value trimmed.
    pub fn trimmed(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|(k, v)| (*k, v.trim().to_string()))
                .collect(),
        }
    }

    /// Require name and email, and a well-formed email.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (Some(_), Some(email)) = (
            self.value_for(FieldCategory::FullName),
            self.value_for(FieldCategory::Email),
        ) else {
            return Err(ValidationError::MissingRequired);
        };
        if !is_valid_email(email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldCategory, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn into_map(self) -> HashMap<FieldCategory, String> {
        self.values.into_iter().collect()
    }
}

impl From<HashMap<FieldCategory, String>> for Profile {
    fn from(map: HashMap<FieldCategory, String>) -> Self {
        Self {
            values: map.into_iter().collect(),
        }
    }
}

/// Flat key-value persistence for profile fields.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, keys: &[FieldCategory]) -> FillerResult<HashMap<FieldCategory, String>>;
    async fn set(&self, values: HashMap<FieldCategory, String>) -> FillerResult<()>;
    async fn clear(&self) -> FillerResult<()>;

    /// Load every category.
    async fn load_profile(&self) -> FillerResult<Profile> {
        Ok(Profile::from(self.get(&FieldCategory::ALL).await?))
    }
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    inner: RwLock<HashMap<FieldCategory, String>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: Profile) -> Self {
        Self {
            inner: RwLock::new(profile.into_map()),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, keys: &[FieldCategory]) -> FillerResult<HashMap<FieldCategory, String>> {
        let guard = self.inner.read().await;
        Ok(pick(&guard, keys))
    }

    async fn set(&self, values: HashMap<FieldCategory, String>) -> FillerResult<()> {
        self.inner.write().await.extend(values);
        Ok(())
    }

    async fn clear(&self) -> FillerResult<()> {
        self.inner.write().await.clear();
        Ok(())
    }
}

/// JSON object on disk: `{"fullName": "...", "email": "...", ...}`.
#[derive(Debug)]
pub struct JsonFileProfileStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl JsonFileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> FillerResult<HashMap<FieldCategory, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(s) if s.trim().is_empty() => Ok(HashMap::new()),
            Ok(s) => serde_json::from_str(&s).map_err(|e| {
                warn!(path = %self.path.display(), "profile file unreadable: {e}");
                FillerError::storage(e)
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(FillerError::storage(e)),
        }
    }

    async fn write_all(&self, values: &HashMap<FieldCategory, String>) -> FillerResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(FillerError::storage)?;
        }
        let sorted: BTreeMap<_, _> = values.iter().collect();
        let bytes = serde_json::to_vec_pretty(&sorted).map_err(FillerError::storage)?;
        fs::write(&self.path, bytes)
            .await
            .map_err(FillerError::storage)?;
        debug!(path = %self.path.display(), keys = values.len(), "profile written");
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for JsonFileProfileStore {
    async fn get(&self, keys: &[FieldCategory]) -> FillerResult<HashMap<FieldCategory, String>> {
        let _guard = self.lock.read().await;
        let all = self.read_all().await?;
        Ok(pick(&all, keys))
    }

    async fn set(&self, values: HashMap<FieldCategory, String>) -> FillerResult<()> {
        let _guard = self.lock.write().await;
        let mut all = self.read_all().await?;
        all.extend(values);
        self.write_all(&all).await
    }

    async fn clear(&self) -> FillerResult<()> {
        let _guard = self.lock.write().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FillerError::storage(e)),
        }
    }
}

fn pick(
    all: &HashMap<FieldCategory, String>,
    keys: &[FieldCategory],
) -> HashMap<FieldCategory, String> {
    keys.iter()
        .filter_map(|k| all.get(k).map(|v| (*k, v.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_regex_matches_popup_rules() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.io"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("jane example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn validate_requires_name_and_email() {
        let p = Profile::new().with(FieldCategory::Email, "jane@example.com");
        assert_eq!(p.validate(), Err(ValidationError::MissingRequired));

        let p = Profile::new()
            .with(FieldCategory::FullName, "Jane Doe")
            .with(FieldCategory::Email, "   ");
        assert_eq!(p.validate(), Err(ValidationError::MissingRequired));

        let p = Profile::new()
            .with(FieldCategory::FullName, "Jane Doe")
            .with(FieldCategory::Email, "not-an-email");
        assert_eq!(p.validate(), Err(ValidationError::InvalidEmail));

        let p = Profile::new()
            .with(FieldCategory::FullName, "Jane Doe")
            .with(FieldCategory::Email, "jane@example.com");
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn blank_values_are_not_data() {
        let p = Profile::new().with(FieldCategory::Github, "  ");
        assert!(!p.has_data());
        assert_eq!(p.value_for(FieldCategory::Github), None);
        assert_eq!(p.get(FieldCategory::Github), Some("  "));
        assert!(p.with(FieldCategory::Phone, "555").has_data());
    }

    #[test]
    fn profile_serializes_flat() {
        let p = Profile::new()
            .with(FieldCategory::FullName, "Jane")
            .with(FieldCategory::Linkedin, "https://linkedin.com/in/jane");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["fullName"], "Jane");
        assert_eq!(v["linkedin"], "https://linkedin.com/in/jane");

        let back: Profile = serde_json::from_value(v).unwrap();
        assert_eq!(back, p);
    }

    #[tokio::test]
    async fn memory_store_get_set_clear() {
        let store = MemoryProfileStore::new();
        let mut m = HashMap::new();
        m.insert(FieldCategory::Email, "jane@example.com".to_string());
        m.insert(FieldCategory::Phone, "555-0100".to_string());
        store.set(m).await.unwrap();

        let got = store.get(&[FieldCategory::Email]).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[&FieldCategory::Email], "jane@example.com");

        store.clear().await.unwrap();
        assert!(store.load_profile().await.unwrap().iter().next().is_none());
    }

    #[tokio::test]
    async fn json_store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("profile.json");
        let store = JsonFileProfileStore::new(&path);

        // Missing file reads as empty
        assert!(store.get(&FieldCategory::ALL).await.unwrap().is_empty());

        let mut m = HashMap::new();
        m.insert(FieldCategory::FullName, "Jane Doe".to_string());
        store.set(m).await.unwrap();
        let mut m = HashMap::new();
        m.insert(FieldCategory::Github, "https://github.com/jane".to_string());
        store.set(m).await.unwrap();

        let reopened = JsonFileProfileStore::new(&path);
        let p = reopened.load_profile().await.unwrap();
        assert_eq!(p.get(FieldCategory::FullName), Some("Jane Doe"));
        assert_eq!(p.get(FieldCategory::Github), Some("https://github.com/jane"));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"fullName\""));

        reopened.clear().await.unwrap();
        assert!(!path.exists());
        reopened.clear().await.unwrap();
    }

    #[tokio::test]
    async fn json_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileProfileStore::new(&path);
        let err = store.load_profile().await.unwrap_err();
        assert!(matches!(err, FillerError::Storage(_)));
    }
}
