// src/rules.rs
//! Field rule table: per-category substring patterns and a category weight.
//!
//! The built-in table is static data. A TOML file may replace it at startup;
//! after that the table is read-only.
//!
//! TOML shape:
//! ```toml
//! [[rules]]
//! category = "email"
//! weight = 1.0
//! patterns = ["email", "e-mail", "mail"]
//! ```

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::category::FieldCategory;

pub const DEFAULT_RULES_PATH: &str = "config/field_rules.toml";
pub const ENV_RULES_PATH: &str = "AUTOFILL_RULES_PATH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryRule {
    #[serde(deserialize_with = "category_name")]
    pub category: FieldCategory,
    pub patterns: Vec<String>,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

// Rule files are hand-edited; accept any casing of the category key.
fn category_name<'de, D: Deserializer<'de>>(de: D) -> Result<FieldCategory, D::Error> {
    let raw = String::deserialize(de)?;
    raw.parse().map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<CategoryRule>,
}

static BUILTIN: Lazy<RuleTable> = Lazy::new(|| {
    let seed: [(FieldCategory, f32, &[&str]); 7] = [
        (
            FieldCategory::FullName,
            1.0,
            &[
                "name",
                "fullname",
                "full-name",
                "full_name",
                "username",
                "applicant-name",
                "candidate-name",
                "first-name",
                "lastname",
            ],
        ),
        (
            FieldCategory::Email,
            1.0,
            &["email", "e-mail", "email-address", "emailaddress", "mail", "user-email"],
        ),
        (
            FieldCategory::Phone,
            1.0,
            &["phone", "telephone", "mobile", "cell", "phone-number", "phonenumber", "contact"],
        ),
        (
            FieldCategory::Address,
            1.0,
            &["address", "street", "location", "addr", "full-address", "mailing-address"],
        ),
        (
            FieldCategory::Resume,
            0.8,
            &["resume", "cv", "portfolio", "resume-link", "cv-link"],
        ),
        (
            FieldCategory::Linkedin,
            0.8,
            &["linkedin", "linkedin-profile", "linkedin-url"],
        ),
        (
            FieldCategory::Github,
            0.8,
            &["github", "github-profile", "github-url", "git"],
        ),
    ];

    RuleTable {
        rules: seed
            .into_iter()
            .map(|(category, weight, patterns)| CategoryRule {
                category,
                weight,
                patterns: patterns.iter().map(|p| p.to_string()).collect(),
            })
            .collect(),
    }
});

impl RuleTable {
    /// The compiled-in table.
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN
    }

    /// Build a table from rules, normalizing patterns and sorting into
    /// category declaration order so the tie-break never depends on input order.
    pub fn new(rules: Vec<CategoryRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(rules.len());
        for mut r in rules {
            if !seen.insert(r.category) {
                return Err(anyhow!("duplicate rule for category `{}`", r.category));
            }
            if !r.weight.is_finite() || r.weight < 0.0 {
                return Err(anyhow!(
                    "rule `{}` has invalid weight {}",
                    r.category,
                    r.weight
                ));
            }
            r.patterns = r
                .patterns
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect();
            out.push(r);
        }
        out.sort_by_key(|r| r.category.rank());
        Ok(Self { rules: out })
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(toml_str)?;
        Self::new(file.rules)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading field rules from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing field rules from {}", path.display()))
    }

    /// Resolve the table used at startup:
    /// 1) $AUTOFILL_RULES_PATH (must exist)
    /// 2) config/field_rules.toml if present
    /// 3) built-in table
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_RULES_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_RULES_PATH} points to non-existent path"));
            }
            info!(path = %pb.display(), "loading field rules");
            return Self::from_path(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_RULES_PATH);
        if fallback.exists() {
            info!(path = %fallback.display(), "loading field rules");
            return Self::from_path(&fallback);
        }
        Ok(Self::builtin().clone())
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn get(&self, category: FieldCategory) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.category == category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
