// src/page.rs
//! Host-agnostic page model.
//!
//! The host (browser content script, test harness, HTTP client) snapshots the
//! page's forms into a `Document`, lets the crate fill it, then replays the
//! recorded values and synthetic events onto the real elements.

use serde::{Deserialize, Serialize};

use crate::classifier::ElementDescriptor;

/// Control types never considered for filling.
pub const EXCLUDED_TYPES: [&str; 5] = ["password", "hidden", "submit", "button", "reset"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTag {
    Input,
    Textarea,
    Select,
}

impl ControlTag {
    /// Default `type` property the DOM reports for the tag.
    fn default_type(self) -> &'static str {
        match self {
            ControlTag::Input => "text",
            ControlTag::Textarea => "textarea",
            ControlTag::Select => "select-one",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormControl {
    pub tag: ControlTag,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(rename = "type", default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub value: String,
}

impl FormControl {
    pub fn input(input_type: &str) -> Self {
        Self {
            tag: ControlTag::Input,
            name: None,
            id: None,
            placeholder: None,
            input_type: Some(input_type.to_string()),
            value: String::new(),
        }
    }

    pub fn textarea() -> Self {
        Self {
            tag: ControlTag::Textarea,
            input_type: None,
            ..Self::input("text")
        }
    }

    pub fn select() -> Self {
        Self {
            tag: ControlTag::Select,
            input_type: None,
            ..Self::input("text")
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Effective `type`, lowercased, with the DOM default for the tag.
    pub fn control_type(&self) -> String {
        self.input_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.tag.default_type())
            .to_ascii_lowercase()
    }

    pub fn is_excluded(&self) -> bool {
        let t = self.control_type();
        EXCLUDED_TYPES.contains(&t.as_str())
    }

    pub fn descriptor(&self) -> ElementDescriptor {
        ElementDescriptor {
            name: self.name.clone(),
            id: self.id.clone(),
            placeholder: self.placeholder.clone(),
            input_type: self.control_type(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub controls: Vec<FormControl>,
    /// Set once a fill button has been considered for this form.
    #[serde(default)]
    pub processed: bool,
}

impl Form {
    pub fn new(controls: Vec<FormControl>) -> Self {
        Self {
            id: None,
            controls,
            processed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub forms: Vec<Form>,
}

impl Document {
    pub fn new(forms: Vec<Form>) -> Self {
        Self { url: None, forms }
    }
}

/// Enumerates the forms of a page.
pub trait ElementSource {
    fn forms(&self) -> &[Form];
    fn forms_mut(&mut self) -> &mut [Form];

    fn control_mut(&mut self, at: FieldRef) -> Option<&mut FormControl> {
        self.forms_mut()
            .get_mut(at.form)
            .and_then(|f| f.controls.get_mut(at.control))
    }
}

impl ElementSource for Document {
    fn forms(&self) -> &[Form] {
        &self.forms
    }

    fn forms_mut(&mut self) -> &mut [Form] {
        &mut self.forms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub form: usize,
    pub control: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldEvent {
    Input,
    Change,
    Blur,
}

impl FieldEvent {
    /// Dispatch order after a programmatic value change.
    pub const AFTER_FILL: [FieldEvent; 3] = [FieldEvent::Input, FieldEvent::Change, FieldEvent::Blur];
}

/// Dispatches synthetic events so host-side validation sees the change.
pub trait ChangeNotifier {
    fn dispatch(&mut self, at: FieldRef, event: FieldEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedEvent {
    #[serde(flatten)]
    pub at: FieldRef,
    pub event: FieldEvent,
}

/// Records events for the host to replay.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<DispatchedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<DispatchedEvent> {
        self.events
    }
}

impl ChangeNotifier for EventLog {
    fn dispatch(&mut self, at: FieldRef, event: FieldEvent) {
        self.events.push(DispatchedEvent { at, event });
    }
}
