// src/api.rs
//! HTTP surface. The extension posts page snapshots and gets back filled
//! values, the events to replay and the notification to show.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::autofill::AutoFiller;
use crate::classifier::{CategoryScore, Classification, ElementDescriptor, FieldClassifier};
use crate::metrics::{self, Metrics};
use crate::notify::{CollectingPresenter, Notification, NotificationLevel, NotificationPresenter};
use crate::page::{DispatchedEvent, Document, EventLog};
use crate::popup::PopupManager;
use crate::profile::{Profile, ProfileStore};
use crate::scanner::FormOffer;
use crate::shortcut::Trigger;

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<FieldClassifier>,
    pub store: Arc<dyn ProfileStore>,
}

impl AppState {
    pub fn new(classifier: FieldClassifier, store: Arc<dyn ProfileStore>) -> Self {
        Self {
            classifier: Arc::new(classifier),
            store,
        }
    }

    async fn auto_filler(&self, presenter: Arc<dyn NotificationPresenter>) -> AutoFiller {
        AutoFiller::init(self.classifier.clone(), self.store.clone(), presenter).await
    }
}

pub fn create_router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/classify", post(classify))
        .route(
            "/profile",
            get(get_profile).put(put_profile).delete(delete_profile),
        )
        .route("/scan", post(scan))
        .route("/fill", post(fill))
        .route("/trigger", post(trigger))
        .route("/popup/fill", post(popup_fill))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    match metrics {
        Some(m) => router.merge(m.router()),
        None => router,
    }
}

#[derive(Deserialize)]
struct ClassifyQuery {
    #[serde(default)]
    explain: Option<u8>,
}

#[derive(Serialize)]
struct ClassifyResp {
    #[serde(flatten)]
    result: Option<Classification>,
    matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    scores: Option<Vec<CategoryScore>>,
}

async fn classify(
    State(state): State<AppState>,
    Query(q): Query<ClassifyQuery>,
    Json(descriptor): Json<ElementDescriptor>,
) -> Json<ClassifyResp> {
    let result = state.classifier.classify(&descriptor);
    metrics::record_classification(result.map(|r| r.category));
    let scores = (q.explain == Some(1)).then(|| state.classifier.score_all(&descriptor));
    Json(ClassifyResp {
        result,
        matched: result.is_some(),
        scores,
    })
}

#[derive(Serialize)]
struct ProfileResp {
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<Profile>,
}

async fn get_profile(State(state): State<AppState>) -> impl IntoResponse {
    let out = PopupManager::new(state.store.clone()).load().await;
    let status = if out.value.is_some() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ProfileResp {
            notification: out.notification,
            profile: out.value,
        }),
    )
}

async fn put_profile(State(state): State<AppState>, Json(raw): Json<Profile>) -> impl IntoResponse {
    let out = PopupManager::new(state.store.clone()).save(&raw).await;
    let status = if out.value.is_some() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (
        status,
        Json(ProfileResp {
            notification: out.notification,
            profile: out.value,
        }),
    )
}

async fn delete_profile(State(state): State<AppState>) -> impl IntoResponse {
    let notification = PopupManager::new(state.store.clone()).clear(true).await;
    let status = match &notification {
        Some(n) if n.level == NotificationLevel::Error => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    (
        status,
        Json(ProfileResp {
            notification,
            profile: None,
        }),
    )
}

#[derive(Serialize)]
struct ScanResp {
    document: Document,
    offers: Vec<FormOffer>,
}

async fn scan(State(state): State<AppState>, Json(mut document): Json<Document>) -> Json<ScanResp> {
    let af = state.auto_filler(Arc::new(CollectingPresenter::new())).await;
    let offers = af.detect_and_process_forms(&mut document);
    Json(ScanResp { document, offers })
}

#[derive(Deserialize)]
struct FillReq {
    document: Document,
    /// Fill only this form (fill button); all forms when absent.
    #[serde(default)]
    form: Option<usize>,
}

#[derive(Serialize)]
struct FillResp {
    handled: bool,
    filled: usize,
    document: Document,
    events: Vec<DispatchedEvent>,
    notification: Option<Notification>,
    /// Escaped banner markup for `notification`, ready to inject.
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<String>,
}

impl FillResp {
    fn new(
        handled: bool,
        filled: usize,
        document: Document,
        log: EventLog,
        presenter: &CollectingPresenter,
    ) -> Self {
        let notification = presenter.last();
        Self {
            handled,
            filled,
            document,
            events: log.into_events(),
            html: notification.as_ref().map(Notification::to_html),
            notification,
        }
    }
}

async fn fill(State(state): State<AppState>, Json(req): Json<FillReq>) -> Json<FillResp> {
    let presenter = Arc::new(CollectingPresenter::new());
    let mut af = state.auto_filler(presenter.clone()).await;
    let mut document = req.document;
    let mut log = EventLog::new();

    let report = match req.form {
        Some(form) => af.fill_form(&mut document, form, &mut log).await,
        None => af.fill_all_forms_on_page(&mut document, &mut log).await,
    };
    Json(FillResp::new(true, report.filled, document, log, &presenter))
}

#[derive(Deserialize)]
struct TriggerReq {
    trigger: Trigger,
    document: Document,
}

async fn trigger(State(state): State<AppState>, Json(req): Json<TriggerReq>) -> Json<FillResp> {
    let presenter = Arc::new(CollectingPresenter::new());
    let mut af = state.auto_filler(presenter.clone()).await;
    let mut document = req.document;
    let mut log = EventLog::new();

    let report = af.handle_trigger(&req.trigger, &mut document, &mut log).await;
    let handled = report.is_some();
    let filled = report.map(|r| r.filled).unwrap_or(0);
    Json(FillResp::new(handled, filled, document, log, &presenter))
}

#[derive(Deserialize)]
struct PopupFillReq {
    /// Active page snapshot; absent when the browser has no active tab.
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Serialize)]
struct PopupFillResp {
    status: Option<Notification>,
    #[serde(flatten)]
    fill: FillResp,
}

async fn popup_fill(
    State(state): State<AppState>,
    Json(req): Json<PopupFillReq>,
) -> Json<PopupFillResp> {
    let presenter = Arc::new(CollectingPresenter::new());
    let popup = PopupManager::new(state.store.clone());
    let mut document = req.document;
    let mut log = EventLog::new();

    let out = popup
        .fill_current_page(
            document.as_mut(),
            state.classifier.clone(),
            presenter.clone(),
            &mut log,
        )
        .await;
    let handled = out.value.is_some();
    let filled = out.value.map(|r| r.filled).unwrap_or(0);
    Json(PopupFillResp {
        status: out.notification,
        fill: FillResp::new(handled, filled, document.unwrap_or_default(), log, &presenter),
    })
}
