// src/category.rs
//! Semantic categories a form field can be classified into.
//!
//! Declaration order matters: it is the rule table order and therefore the
//! tie-break order when two categories score the same.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldCategory {
    FullName,
    Email,
    Phone,
    Address,
    Resume,
    Linkedin,
    Github,
}

impl FieldCategory {
    /// All categories in declaration (= tie-break) order.
    pub const ALL: [FieldCategory; 7] = [
        FieldCategory::FullName,
        FieldCategory::Email,
        FieldCategory::Phone,
        FieldCategory::Address,
        FieldCategory::Resume,
        FieldCategory::Linkedin,
        FieldCategory::Github,
    ];

    /// Profile store key for this category.
    pub fn key(self) -> &'static str {
        match self {
            FieldCategory::FullName => "fullName",
            FieldCategory::Email => "email",
            FieldCategory::Phone => "phone",
            FieldCategory::Address => "address",
            FieldCategory::Resume => "resume",
            FieldCategory::Linkedin => "linkedin",
            FieldCategory::Github => "github",
        }
    }

    /// Position in `ALL`.
    pub fn rank(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for FieldCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        FieldCategory::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(t))
            .ok_or_else(|| UnknownCategory(t.to_string()))
    }
}
