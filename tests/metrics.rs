// tests/metrics.rs
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

const APP_VARS: [&str; 3] = [
    "AUTOFILL_DEBUG_ROUTES",
    "AUTOFILL_PROFILE_PATH",
    "AUTOFILL_RULES_PATH",
];

// Clears the app env vars when dropped, even if an assertion fails first.
struct EnvReset;

impl Drop for EnvReset {
    fn drop(&mut self) {
        for k in APP_VARS {
            std::env::remove_var(k);
        }
    }
}

// Build full in-process app from env, with debug routes and an isolated profile file.
async fn build_app(dir: &std::path::Path) -> Router {
    std::env::set_var("AUTOFILL_DEBUG_ROUTES", "1");
    std::env::set_var(
        "AUTOFILL_PROFILE_PATH",
        dir.join("profile.json").display().to_string(),
    );
    std::env::remove_var("AUTOFILL_RULES_PATH");
    auto_form_filler::app()
        .await
        .expect("app() should build Router in tests")
}

async fn body_text(resp: axum::response::Response) -> String {
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    String::from_utf8(body.to_vec()).unwrap()
}

#[serial_test::serial]
#[tokio::test]
async fn metrics_endpoint_counts_classifications_and_fills() {
    let _reset = EnvReset;
    let tmp = tempfile::tempdir().unwrap();
    let app = build_app(tmp.path()).await;

    let r = app
        .clone()
        .oneshot(
            Request::post("/classify")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"type":"tel"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    let r = app
        .clone()
        .oneshot(
            Request::put("/profile")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"fullName":"Jane Doe","email":"jane@example.com"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    let r = app
        .clone()
        .oneshot(
            Request::post("/fill")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"document":{"forms":[{"controls":[{"tag":"input","type":"email","name":"email"}]}]}}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    let m = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(m.status(), StatusCode::OK);
    let text = body_text(m).await;

    for needle in [
        "autofill_classifications_total",
        "autofill_fill_runs_total",
        "autofill_fields_filled_total",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
    assert!(text.contains(r#"category="phone""#), "{text}");
    // counted by the form scan inside /fill, not by /classify
    assert!(text.contains(r#"category="email""#), "{text}");
}

#[serial_test::serial]
#[tokio::test]
async fn profile_survives_app_rebuild() {
    let _reset = EnvReset;
    let tmp = tempfile::tempdir().unwrap();
    let app = build_app(tmp.path()).await;

    let r = app
        .oneshot(
            Request::put("/profile")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"fullName":"Jane Doe","email":"jane@example.com","github":"https://github.com/jane"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    let app = build_app(tmp.path()).await;
    let r = app
        .oneshot(Request::get("/profile").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);
    let text = body_text(r).await;
    assert!(text.contains("https://github.com/jane"), "{text}");
    assert!(tmp.path().join("profile.json").exists());
}
