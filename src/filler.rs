// src/filler.rs
//! Writes profile values into detected, still-empty controls.

use serde::Serialize;
use tracing::debug;

use crate::notify::Notification;
use crate::page::{ChangeNotifier, ElementSource, FieldEvent, FieldRef};
use crate::profile::Profile;
use crate::scanner::DetectedField;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    pub filled: usize,
    /// Controls that received a value, in fill order.
    pub touched: Vec<FieldRef>,
}

impl FillReport {
    pub fn merge(&mut self, other: FillReport) {
        self.filled += other.filled;
        self.touched.extend(other.touched);
    }

    /// Summary after a single form's fill button.
    pub fn form_notification(&self) -> Notification {
        if self.filled > 0 {
            Notification::success(format!("✅ {} field(s) filled successfully!", self.filled))
        } else {
            Notification::warning("⚠️ No empty fields found to fill")
        }
    }

    /// Summary after filling every form on the page.
    pub fn page_notification(&self) -> Notification {
        if self.filled > 0 {
            Notification::success(format!(
                "✅ Auto filled {} field(s) across all forms!",
                self.filled
            ))
        } else {
            Notification::warning("⚠️ No compatible empty fields found on this page")
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Filler;

impl Filler {
    /// Fill one form. A field is written only if the profile holds a
    /// non-blank value for its category and the control is empty, so a
    /// repeated fill leaves earlier values alone.
    pub fn fill_form<S, N>(
        &self,
        page: &mut S,
        form: usize,
        fields: &[DetectedField],
        profile: &Profile,
        notifier: &mut N,
    ) -> FillReport
    where
        S: ElementSource + ?Sized,
        N: ChangeNotifier + ?Sized,
    {
        let mut report = FillReport::default();

        for field in fields {
            let Some(value) = profile.value_for(field.category) else {
                continue;
            };
            let at = FieldRef {
                form,
                control: field.control,
            };
            let Some(control) = page.control_mut(at) else {
                debug!(?at, "detected field no longer present");
                continue;
            };
            if !control.value.is_empty() {
                continue;
            }

            control.value = value.to_string();
            for event in FieldEvent::AFTER_FILL {
                notifier.dispatch(at, event);
            }
            report.filled += 1;
            report.touched.push(at);
        }

        report
    }
}
