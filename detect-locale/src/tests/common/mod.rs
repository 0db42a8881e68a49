// Common test utilities and helpers

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use tower::ServiceExt;

use crate::config::LocaleSettings;
use crate::middleware::{LocaleConfig, LocaleHandler, PipelineHandler};
use crate::{AppState, build_router};

/// Locale settings with the given available locales and sources, other fields defaulted
pub fn locale_settings(available: &[&str], sources: &[&str]) -> LocaleSettings {
    LocaleSettings {
        available: available.iter().map(|s| s.to_string()).collect(),
        sources: sources.iter().map(|s| s.to_string()).collect(),
        ..LocaleSettings::default()
    }
}

pub fn locale_config(settings: &LocaleSettings) -> LocaleConfig {
    LocaleHandler::configure(settings).expect("Failed to configure locale handler")
}

/// The full application router for the given settings
pub fn test_app(settings: &LocaleSettings) -> Router {
    build_router(Arc::new(AppState::new(locale_config(settings))))
}

/// GET request with the given headers
pub fn get(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).expect("Failed to build request")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }
}

/// Run one request through the router
pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.expect("Router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body");

    TestResponse { status, headers, body: String::from_utf8_lossy(&bytes).into_owned() }
}
