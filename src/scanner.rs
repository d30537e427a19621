// src/scanner.rs
//! Form scanning: find fillable controls in a form and classify them.

use serde::Serialize;
use tracing::debug;

use crate::category::FieldCategory;
use crate::classifier::FieldClassifier;
use crate::metrics;
use crate::page::{ElementSource, Form};
use crate::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedField {
    /// Index into `Form::controls`.
    pub control: usize,
    pub category: FieldCategory,
    pub confidence: f32,
}

/// A form that gets a fill button.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormOffer {
    pub form: usize,
    pub fields: Vec<DetectedField>,
}

#[derive(Debug, Clone, Copy)]
pub struct FormScanner<'a> {
    classifier: &'a FieldClassifier,
}

impl<'a> FormScanner<'a> {
    pub fn new(classifier: &'a FieldClassifier) -> Self {
        Self { classifier }
    }

    /// Classify every non-excluded control, in document order.
    pub fn analyze_form(&self, form: &Form) -> Vec<DetectedField> {
        form.controls
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_excluded())
            .filter_map(|(i, c)| {
                let result = self.classifier.classify(&c.descriptor());
                metrics::record_classification(result.map(|r| r.category));
                result.map(|r| DetectedField {
                    control: i,
                    category: r.category,
                    confidence: r.confidence,
                })
            })
            .collect()
    }

    /// Walk unprocessed forms. Any form with detected fields is marked
    /// processed; it is offered a fill button only when the profile has data.
    pub fn detect_forms<S: ElementSource + ?Sized>(
        &self,
        page: &mut S,
        profile: &Profile,
    ) -> Vec<FormOffer> {
        let has_data = profile.has_data();
        let mut offers = Vec::new();

        for (index, form) in page.forms_mut().iter_mut().enumerate() {
            if form.processed {
                continue;
            }
            let fields = self.analyze_form(form);
            debug!(form = index, fields = fields.len(), "analyzed form");
            if fields.is_empty() {
                continue;
            }
            form.processed = true;
            if has_data {
                offers.push(FormOffer {
                    form: index,
                    fields,
                });
            } else {
                debug!(form = index, "no profile data, fill button skipped");
            }
        }
        offers
    }
}
