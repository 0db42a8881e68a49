//! Locale detection middleware for axum.
//!
//! Negotiates a request's locale from the `lang` cookie and the
//! `Accept-Language` header against a configured list of supported locales,
//! then exposes the canonical tag (`language[-REGION]`) to later stages.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod handlers;
pub mod locale;
pub mod middleware;
pub mod utils;

#[cfg(test)]
mod tests;

rust_i18n::i18n!("locales", fallback = "en");

use middleware::{LocaleConfig, LocaleHandler};

/// Shared state of the demo server
#[derive(Debug, Clone)]
pub struct AppState {
    pub locale: Arc<LocaleConfig>,
}

impl AppState {
    pub fn new(locale: LocaleConfig) -> Self {
        Self { locale: Arc::new(locale) }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(handlers::locale::detected_locale, handlers::locale::get_locale),
    components(schemas(handlers::LocaleResponse)),
    tags((name = "Locale", description = "Locale detected for the current request"))
)]
pub struct ApiDoc;

/// Routes wrapped in locale detection and request tracing
pub fn build_router(state: Arc<AppState>) -> Router {
    let locale = Arc::clone(&state.locale);

    let router = Router::new()
        .route("/", get(handlers::detected_locale))
        .route("/api/locale", get(handlers::get_locale))
        .route("/health", get(handlers::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::not_found)
        .with_state(state);

    middleware::mount::<LocaleHandler, _>(router, locale).layer(TraceLayer::new_for_http())
}
