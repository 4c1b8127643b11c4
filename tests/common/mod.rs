//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use battery_diag::config::ServiceConfig;

/// Default configuration with a fixed seed.
pub fn seeded_config(seed: u64) -> ServiceConfig {
    let mut config = ServiceConfig::baseline();
    config.generator.seed = Some(seed);
    config
}

#[cfg(feature = "api")]
pub mod http {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use battery_diag::api::AppState;

    /// Fresh seeded API state.
    pub fn state(seed: u64) -> Arc<AppState> {
        Arc::new(AppState::new(&super::seeded_config(seed)))
    }

    /// Sends a GET through `app` and decodes the JSON body.
    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }
}
