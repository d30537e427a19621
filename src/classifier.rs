// src/classifier.rs
//! Field classifier: maps an input element's attributes to a semantic category.
//!
//! Scoring is additive over every pattern of every category:
//! name hit = weight*0.4, id hit = weight*0.3, placeholder hit = weight*0.2,
//! plus weight*0.5 for `type="email"` (email) and `type="tel"` (phone).
//! The strictly highest score wins; on ties the first category in
//! `FieldCategory::ALL` order is kept. Scores at or below the minimum
//! confidence yield no match.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::FieldCategory;
use crate::config::{anon_hash, dev_logging_enabled};
use crate::rules::{CategoryRule, RuleTable};

pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.2;

const NAME_FACTOR: f32 = 0.4;
const ID_FACTOR: f32 = 0.3;
const PLACEHOLDER_FACTOR: f32 = 0.2;
const TYPE_BONUS: f32 = 0.5;

fn default_type() -> String {
    "text".to_string()
}

/// Observable attributes of a candidate element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(rename = "type", default = "default_type")]
    pub input_type: String,
}

impl Default for ElementDescriptor {
    fn default() -> Self {
        Self {
            name: None,
            id: None,
            placeholder: None,
            input_type: default_type(),
        }
    }
}

impl ElementDescriptor {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = input_type.into();
        self
    }

    fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.name.as_deref().unwrap_or_default(),
            self.id.as_deref().unwrap_or_default(),
            self.placeholder.as_deref().unwrap_or_default(),
            self.input_type
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: FieldCategory,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: FieldCategory,
    pub score: f32,
}

#[derive(Debug, Clone)]
pub struct FieldClassifier {
    rules: RuleTable,
    min_confidence: f32,
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new(RuleTable::builtin().clone())
    }
}

impl FieldClassifier {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    /// Override the minimum confidence. Non-finite values fall back to the default.
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = if min_confidence.is_finite() {
            min_confidence.clamp(0.0, 1.0)
        } else {
            DEFAULT_MIN_CONFIDENCE
        };
        self
    }

    pub fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Best category for `descriptor`, or `None` if nothing clears the minimum.
    pub fn classify(&self, descriptor: &ElementDescriptor) -> Option<Classification> {
        let mut best: Option<Classification> = None;
        let mut highest = 0.0f32;

        for rule in self.rules.rules() {
            let score = score_rule(rule, descriptor);
            if score > highest {
                highest = score;
                best = Some(Classification {
                    category: rule.category,
                    confidence: score,
                });
            }
        }

        let result = best.filter(|b| b.confidence > self.min_confidence);

        if dev_logging_enabled() {
            debug!(
                target: "classifier",
                id = %anon_hash(&descriptor.fingerprint()),
                category = ?result.map(|r| r.category),
                score = highest,
                "classified field"
            );
        }
        result
    }

    /// Scores for every category in table order, including zeros.
    pub fn score_all(&self, descriptor: &ElementDescriptor) -> Vec<CategoryScore> {
        self.rules
            .rules()
            .iter()
            .map(|rule| CategoryScore {
                category: rule.category,
                score: score_rule(rule, descriptor),
            })
            .collect()
    }
}

fn score_rule(rule: &CategoryRule, d: &ElementDescriptor) -> f32 {
    let name = lower(d.name.as_deref());
    let id = lower(d.id.as_deref());
    let placeholder = lower(d.placeholder.as_deref());

    let mut score = 0.0f32;
    for pattern in &rule.patterns {
        let p = pattern.as_str();
        if name.as_deref().is_some_and(|v| v.contains(p)) {
            score += rule.weight * NAME_FACTOR;
        }
        if id.as_deref().is_some_and(|v| v.contains(p)) {
            score += rule.weight * ID_FACTOR;
        }
        if placeholder.as_deref().is_some_and(|v| v.contains(p)) {
            score += rule.weight * PLACEHOLDER_FACTOR;
        }
    }

    let ty = d.input_type.trim();
    let type_hit = match rule.category {
        FieldCategory::Email => ty.eq_ignore_ascii_case("email"),
        FieldCategory::Phone => ty.eq_ignore_ascii_case("tel"),
        _ => false,
    };
    if type_hit {
        score += rule.weight * TYPE_BONUS;
    }
    score
}

// Empty attributes count as absent.
fn lower(v: Option<&str>) -> Option<String> {
    v.filter(|s| !s.is_empty()).map(str::to_lowercase)
}

static DEFAULT_CLASSIFIER: Lazy<FieldClassifier> = Lazy::new(FieldClassifier::default);

/// Classify against the built-in rule table and default threshold.
pub fn classify(descriptor: &ElementDescriptor) -> Option<Classification> {
    DEFAULT_CLASSIFIER.classify(descriptor)
}
