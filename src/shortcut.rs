// src/shortcut.rs
//! Fill triggers: keyboard chord, extension command, runtime message.

use serde::{Deserialize, Serialize};

pub const FILL_COMMAND: &str = "fill-form";
pub const FILL_MESSAGE_ACTION: &str = "fillForms";

/// A keydown as the host observed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyChord {
    pub key: String,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
}

impl KeyChord {
    /// Ctrl+Shift+F, or Cmd+Shift+F on macOS. With Shift held the key reports "F".
    pub fn is_fill_shortcut(&self) -> bool {
        (self.ctrl_key || self.meta_key) && self.shift_key && self.key == "F"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Trigger {
    Shortcut(KeyChord),
    Command(String),
    Message(String),
}

impl Trigger {
    pub fn requests_fill(&self) -> bool {
        match self {
            Trigger::Shortcut(chord) => chord.is_fill_shortcut(),
            Trigger::Command(name) => name == FILL_COMMAND,
            Trigger::Message(action) => action == FILL_MESSAGE_ACTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(key: &str, ctrl: bool, meta: bool, shift: bool) -> KeyChord {
        KeyChord {
            key: key.into(),
            ctrl_key: ctrl,
            meta_key: meta,
            shift_key: shift,
        }
    }

    #[test]
    fn ctrl_or_meta_with_shift_f() {
        assert!(chord("F", true, false, true).is_fill_shortcut());
        assert!(chord("F", false, true, true).is_fill_shortcut());
    }

    #[test]
    fn missing_modifier_or_wrong_key() {
        assert!(!chord("F", true, false, false).is_fill_shortcut());
        assert!(!chord("F", false, false, true).is_fill_shortcut());
        assert!(!chord("f", true, false, true).is_fill_shortcut());
        assert!(!chord("G", true, false, true).is_fill_shortcut());
    }

    #[test]
    fn triggers_decode_from_host_json() {
        let t: Trigger = serde_json::from_str(
            r#"{"kind":"shortcut","value":{"key":"F","ctrlKey":true,"shiftKey":true}}"#,
        )
        .unwrap();
        assert!(t.requests_fill());

        let t: Trigger = serde_json::from_str(r#"{"kind":"message","value":"fillForms"}"#).unwrap();
        assert!(t.requests_fill());
        assert!(Trigger::Command(FILL_COMMAND.into()).requests_fill());
        assert!(!Trigger::Command("open-popup".into()).requests_fill());
        assert!(!Trigger::Message("ping".into()).requests_fill());
    }
}
