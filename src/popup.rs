// src/popup.rs
//! Popup actions: load, save, clear the profile and "fill now" on the active page.
//!
//! Every action returns the status notification to show, if any; failures
//! never escape as errors.

use std::sync::Arc;
use tracing::error;

use crate::autofill::AutoFiller;
use crate::category::FieldCategory;
use crate::classifier::FieldClassifier;
use crate::error::{FillerError, FillerResult};
use crate::filler::FillReport;
use crate::notify::{Notification, NotificationPresenter};
use crate::page::{ChangeNotifier, Document};
use crate::profile::{Profile, ProfileStore};

pub struct PopupManager {
    store: Arc<dyn ProfileStore>,
}

#[derive(Debug, Clone)]
pub struct PopupOutcome<T> {
    pub notification: Option<Notification>,
    pub value: Option<T>,
}

impl<T> PopupOutcome<T> {
    fn ok(notification: Notification, value: T) -> Self {
        Self {
            notification: Some(notification),
            value: Some(value),
        }
    }

    fn quiet(value: T) -> Self {
        Self {
            notification: None,
            value: Some(value),
        }
    }

    fn failed(notification: Notification) -> Self {
        Self {
            notification: Some(notification),
            value: None,
        }
    }

    /// Status text, when there is one to show.
    pub fn message(&self) -> Option<&str> {
        self.notification.as_ref().map(|n| n.message.as_str())
    }
}

impl PopupManager {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Saved profile for the popup form. A successful load shows no status.
    pub async fn load(&self) -> PopupOutcome<Profile> {
        match self.store.load_profile().await {
            Ok(p) => PopupOutcome::quiet(p),
            Err(e) => {
                error!("Error loading saved data: {e}");
                PopupOutcome::failed(Notification::error("Error loading saved data"))
            }
        }
    }

    /// Trim, validate and persist all seven fields.
    pub async fn save(&self, raw: &Profile) -> PopupOutcome<Profile> {
        match self.try_save(raw).await {
            Ok(saved) => PopupOutcome::ok(Notification::success("Data saved successfully! 🎉"), saved),
            Err(FillerError::Validation(v)) => PopupOutcome::failed(Notification::error(v.to_string())),
            Err(e) => {
                error!("Error saving data: {e}");
                PopupOutcome::failed(Notification::error("Error saving data. Please try again."))
            }
        }
    }

    async fn try_save(&self, raw: &Profile) -> FillerResult<Profile> {
        let mut form = Profile::new();
        for category in FieldCategory::ALL {
            form.set(category, raw.get(category).unwrap_or_default());
        }
        let form = form.trimmed();
        form.validate()?;
        self.store.set(form.clone().into_map()).await?;
        Ok(form)
    }

    /// Clear stored data; nothing happens unless the user confirmed.
    pub async fn clear(&self, confirmed: bool) -> Option<Notification> {
        if !confirmed {
            return None;
        }
        Some(match self.store.clear().await {
            Ok(()) => Notification::success("All data cleared successfully"),
            Err(e) => {
                error!("Error clearing data: {e}");
                Notification::error("Error clearing data")
            }
        })
    }

    /// Fill every form on the active page with the saved profile.
    pub async fn fill_current_page<N: ChangeNotifier + ?Sized>(
        &self,
        page: Option<&mut Document>,
        classifier: Arc<FieldClassifier>,
        presenter: Arc<dyn NotificationPresenter>,
        notifier: &mut N,
    ) -> PopupOutcome<FillReport> {
        let Some(page) = page else {
            return PopupOutcome::failed(Notification::from(&FillerError::NoActivePage));
        };

        let profile = match self.store.load_profile().await {
            Ok(p) => p,
            Err(e) => {
                error!("Error filling current page: {e}");
                return PopupOutcome::failed(Notification::error(
                    "Error filling page. Please try again.",
                ));
            }
        };
        if profile.value_for(FieldCategory::FullName).is_none()
            && profile.value_for(FieldCategory::Email).is_none()
        {
            return PopupOutcome::failed(Notification::error("Please save your data first"));
        }

        let mut filler = AutoFiller::new(classifier, self.store.clone(), presenter);
        let report = filler.fill_all_forms_on_page(page, notifier).await;
        PopupOutcome::ok(
            Notification::success("Form filling initiated! Check the page."),
            report,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{CollectingPresenter, NotificationLevel};
    use crate::page::{EventLog, Form, FormControl};
    use crate::profile::MemoryProfileStore;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct BrokenStore;

    #[async_trait]
    impl ProfileStore for BrokenStore {
        async fn get(&self, _: &[FieldCategory]) -> FillerResult<HashMap<FieldCategory, String>> {
            Err(FillerError::storage("quota exceeded"))
        }
        async fn set(&self, _: HashMap<FieldCategory, String>) -> FillerResult<()> {
            Err(FillerError::storage("quota exceeded"))
        }
        async fn clear(&self) -> FillerResult<()> {
            Err(FillerError::storage("quota exceeded"))
        }
    }

    fn raw(name: &str, email: &str) -> Profile {
        Profile::new()
            .with(FieldCategory::FullName, name)
            .with(FieldCategory::Email, email)
    }

    #[tokio::test]
    async fn save_trims_and_persists_all_keys() {
        let store = Arc::new(MemoryProfileStore::new());
        let popup = PopupManager::new(store.clone());
        let out = popup.save(&raw("  Jane Doe ", " jane@example.com ")).await;
        let n = out.notification.unwrap();
        assert_eq!(n.level, NotificationLevel::Success);
        assert_eq!(n.message, "Data saved successfully! 🎉");

        let stored = store.load_profile().await.unwrap();
        assert_eq!(stored.get(FieldCategory::FullName), Some("Jane Doe"));
        assert_eq!(stored.get(FieldCategory::Email), Some("jane@example.com"));
        assert_eq!(stored.get(FieldCategory::Github), Some(""));

        let loaded = popup.load().await;
        assert!(loaded.notification.is_none());
        assert_eq!(loaded.value.unwrap(), stored);
    }

    #[tokio::test]
    async fn save_rejects_missing_and_malformed() {
        let store = Arc::new(MemoryProfileStore::new());
        let popup = PopupManager::new(store.clone());

        let out = popup.save(&raw("Jane", "")).await;
        assert_eq!(out.message().unwrap(), "Please fill in at least Name and Email");
        assert!(out.value.is_none());

        let out = popup.save(&raw("Jane", "jane@nowhere")).await;
        assert_eq!(out.message().unwrap(), "Please enter a valid email address");

        assert!(!store.load_profile().await.unwrap().has_data());
    }

    #[tokio::test]
    async fn storage_failures_become_notifications() {
        let popup = PopupManager::new(Arc::new(BrokenStore));
        let out = popup.save(&raw("Jane", "jane@example.com")).await;
        assert_eq!(out.message().unwrap(), "Error saving data. Please try again.");

        let out = popup.load().await;
        assert_eq!(out.message().unwrap(), "Error loading saved data");

        let n = popup.clear(true).await.unwrap();
        assert_eq!(n.message, "Error clearing data");
    }

    #[tokio::test]
    async fn clear_requires_confirmation() {
        let store = Arc::new(MemoryProfileStore::with_profile(raw("Jane", "jane@example.com")));
        let popup = PopupManager::new(store.clone());
        assert!(popup.clear(false).await.is_none());
        assert!(store.load_profile().await.unwrap().has_data());

        let n = popup.clear(true).await.unwrap();
        assert_eq!(n.message, "All data cleared successfully");
        assert!(!store.load_profile().await.unwrap().has_data());
    }

    #[tokio::test]
    async fn fill_now_checks_page_and_profile() {
        let classifier = Arc::new(FieldClassifier::default());
        let presenter = Arc::new(CollectingPresenter::new());
        let mut log = EventLog::new();

        let popup = PopupManager::new(Arc::new(MemoryProfileStore::new()));
        let out = popup
            .fill_current_page(None, classifier.clone(), presenter.clone(), &mut log)
            .await;
        assert_eq!(out.message().unwrap(), "No active tab found");

        let mut doc = Document::new(vec![Form::new(vec![
            FormControl::input("email").named("email"),
        ])]);
        let out = popup
            .fill_current_page(Some(&mut doc), classifier.clone(), presenter.clone(), &mut log)
            .await;
        assert_eq!(out.message().unwrap(), "Please save your data first");

        let popup = PopupManager::new(Arc::new(MemoryProfileStore::with_profile(
            Profile::new().with(FieldCategory::Email, "jane@example.com"),
        )));
        let out = popup
            .fill_current_page(Some(&mut doc), classifier, presenter.clone(), &mut log)
            .await;
        assert_eq!(out.message().unwrap(), "Form filling initiated! Check the page.");
        assert_eq!(out.value.unwrap().filled, 1);
        assert_eq!(doc.forms[0].controls[0].value, "jane@example.com");
        assert_eq!(
            presenter.last().unwrap().message,
            "✅ Auto filled 1 field(s) across all forms!"
        );
    }
}
