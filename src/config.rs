// src/config.rs
//! Env-driven service configuration plus the dev-logging gate.

use anyhow::Result;
use std::path::PathBuf;

use crate::classifier::{FieldClassifier, DEFAULT_MIN_CONFIDENCE};
use crate::rules::RuleTable;

// --- env defaults & names ---
pub const DEFAULT_PROFILE_PATH: &str = "state/profile.json";

pub const ENV_PROFILE_PATH: &str = "AUTOFILL_PROFILE_PATH";
pub const ENV_MIN_CONFIDENCE: &str = "AUTOFILL_MIN_CONFIDENCE";
pub const ENV_DEBUG_ROUTES: &str = "AUTOFILL_DEBUG_ROUTES";
pub const ENV_DEV_LOG: &str = "AUTOFILL_DEV_LOG";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile_path: PathBuf,
    pub min_confidence: f32,
    pub debug_routes: bool,
    pub rules: RuleTable,
}

impl AppConfig {
    /// Read configuration from the process environment.
    /// The rule table comes from `RuleTable::load_default`.
    pub fn from_env() -> Result<Self> {
        let profile_path = std::env::var(ENV_PROFILE_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROFILE_PATH));

        let min_confidence = parse_threshold_env(std::env::var(ENV_MIN_CONFIDENCE).ok())
            .unwrap_or(DEFAULT_MIN_CONFIDENCE);

        let debug_routes = std::env::var(ENV_DEBUG_ROUTES)
            .ok()
            .is_some_and(|v| v == "1");

        Ok(Self {
            profile_path,
            min_confidence,
            debug_routes,
            rules: RuleTable::load_default()?,
        })
    }

    pub fn classifier(&self) -> FieldClassifier {
        FieldClassifier::new(self.rules.clone()).with_min_confidence(self.min_confidence)
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

// Dev logging gate: AUTOFILL_DEV_LOG=1 AND dev env (debug or SHUTTLE_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Short anonymized id so logs never carry raw form attributes.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Test helper: switches the working directory, clears the named env vars and
/// puts both back on drop, so a failed assertion cannot leak state.
#[cfg(test)]
pub(crate) mod test_env {
    use std::env;
    use std::path::{Path, PathBuf};

    pub(crate) struct EnvGuard {
        cwd: PathBuf,
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        pub(crate) fn enter(dir: &Path, vars: &[&'static str]) -> Self {
            let cwd = env::current_dir().expect("current dir");
            let saved = vars.iter().map(|&k| (k, env::var(k).ok())).collect();
            for k in vars {
                env::remove_var(k);
            }
            env::set_current_dir(dir).expect("enter temp dir");
            Self { cwd, saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.cwd);
            for (k, v) in &self.saved {
                match v {
                    Some(v) => env::set_var(k, v),
                    None => env::remove_var(k),
                }
            }
        }
    }
}
