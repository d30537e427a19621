// src/lib.rs
// Public library surface for integration tests and hosts that link the crate directly.

pub mod api;
pub mod autofill;
pub mod category;
pub mod classifier;
pub mod config;
pub mod error;
pub mod filler;
pub mod metrics;
pub mod notify;
pub mod page;
pub mod popup;
pub mod profile;
pub mod rules;
pub mod scanner;
pub mod shortcut;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::category::FieldCategory;
pub use crate::classifier::{classify, Classification, ElementDescriptor, FieldClassifier};
pub use crate::profile::{JsonFileProfileStore, MemoryProfileStore, Profile, ProfileStore};

use std::sync::Arc;
use tracing::info;

/// Build the full router from the environment (profile path, rules, threshold,
/// debug routes). Used by the binary and by integration tests.
pub async fn app() -> anyhow::Result<axum::Router> {
    let cfg = config::AppConfig::from_env()?;
    info!(
        profile = %cfg.profile_path.display(),
        rules = cfg.rules.len(),
        min_confidence = cfg.min_confidence,
        "auto-form-filler config loaded"
    );

    let store: Arc<dyn ProfileStore> = Arc::new(JsonFileProfileStore::new(&cfg.profile_path));
    let state = AppState::new(cfg.classifier(), store);

    let metrics = if cfg.debug_routes {
        Some(crate::metrics::Metrics::init()?)
    } else {
        None
    };
    Ok(create_router(state, metrics.as_ref()))
}
