// src/autofill.rs
//! Page-side orchestration: load the profile, offer fill buttons, fill on
//! demand and report the outcome through a presenter.

use std::sync::Arc;
use tracing::{info, warn};

use crate::classifier::FieldClassifier;
use crate::filler::{FillReport, Filler};
use crate::metrics;
use crate::notify::{Notification, NotificationPresenter};
use crate::page::{ChangeNotifier, ElementSource};
use crate::profile::{Profile, ProfileStore};
use crate::scanner::{FormOffer, FormScanner};
use crate::shortcut::Trigger;

pub const NO_PROFILE_MESSAGE: &str = "⚠️ Please save your data in the extension popup first";

pub struct AutoFiller {
    classifier: Arc<FieldClassifier>,
    store: Arc<dyn ProfileStore>,
    presenter: Arc<dyn NotificationPresenter>,
    profile: Profile,
}

impl AutoFiller {
    pub fn new(
        classifier: Arc<FieldClassifier>,
        store: Arc<dyn ProfileStore>,
        presenter: Arc<dyn NotificationPresenter>,
    ) -> Self {
        Self {
            classifier,
            store,
            presenter,
            profile: Profile::default(),
        }
    }

    /// Construct and load the profile in one step.
    pub async fn init(
        classifier: Arc<FieldClassifier>,
        store: Arc<dyn ProfileStore>,
        presenter: Arc<dyn NotificationPresenter>,
    ) -> Self {
        let mut me = Self::new(classifier, store, presenter);
        me.load_profile().await;
        me
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Reload from the store. On failure the previous profile stays in place.
    pub async fn load_profile(&mut self) {
        match self.store.load_profile().await {
            Ok(p) => self.profile = p,
            Err(e) => warn!("loading profile failed: {e}"),
        }
    }

    fn scanner(&self) -> FormScanner<'_> {
        FormScanner::new(&self.classifier)
    }

    /// Mark newly seen forms and return those that get a fill button.
    pub fn detect_and_process_forms<S: ElementSource + ?Sized>(
        &self,
        page: &mut S,
    ) -> Vec<FormOffer> {
        let offers = self.scanner().detect_forms(page, &self.profile);
        info!(
            forms = page.forms().len(),
            offers = offers.len(),
            "detected forms"
        );
        offers
    }

    /// Fill button handler for one form, using the profile as last loaded.
    pub async fn fill_form<S, N>(&self, page: &mut S, form: usize, notifier: &mut N) -> FillReport
    where
        S: ElementSource + ?Sized,
        N: ChangeNotifier + ?Sized,
    {
        let fields = match page.forms().get(form) {
            Some(f) => self.scanner().analyze_form(f),
            None => Vec::new(),
        };
        let report = Filler.fill_form(page, form, &fields, &self.profile, notifier);
        metrics::record_fill(report.filled);
        self.presenter.show(&report.form_notification()).await;
        report
    }

    /// Reload the profile, then fill every form on the page.
    pub async fn fill_all_forms_on_page<S, N>(&mut self, page: &mut S, notifier: &mut N) -> FillReport
    where
        S: ElementSource + ?Sized,
        N: ChangeNotifier + ?Sized,
    {
        self.load_profile().await;

        if !self.profile.has_data() {
            self.presenter
                .show(&Notification::warning(NO_PROFILE_MESSAGE))
                .await;
            return FillReport::default();
        }

        let mut total = FillReport::default();
        for index in 0..page.forms().len() {
            let fields = self.scanner().analyze_form(&page.forms()[index]);
            if fields.is_empty() {
                continue;
            }
            total.merge(Filler.fill_form(page, index, &fields, &self.profile, notifier));
        }

        info!(filled = total.filled, "filled page");
        metrics::record_fill(total.filled);
        self.presenter.show(&total.page_notification()).await;
        total
    }

    /// Run a fill for triggers that ask for one. `None` when the trigger is ignored.
    pub async fn handle_trigger<S, N>(
        &mut self,
        trigger: &Trigger,
        page: &mut S,
        notifier: &mut N,
    ) -> Option<FillReport>
    where
        S: ElementSource + ?Sized,
        N: ChangeNotifier + ?Sized,
    {
        if !trigger.requests_fill() {
            return None;
        }
        Some(self.fill_all_forms_on_page(page, notifier).await)
    }
}
