use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::Uri};
use rust_i18n::t;
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;
use crate::middleware::{RequestVars, ResolvedLocale};
use crate::utils::{ApiError, ApiResult};

#[derive(Debug, Serialize, ToSchema)]
pub struct LocaleResponse {
    /// Canonical locale, e.g. `en-US`
    pub locale: String,
    pub language: String,
    pub region: Option<String>,
    /// Greeting in the detected locale
    pub greeting: String,
}

/// Detected locale as plain text, read from the request variable
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Detected locale", body = String),
        (status = 500, description = "Locale detection is not mounted"),
    ),
    tag = "Locale"
)]
pub async fn detected_locale(
    State(state): State<Arc<AppState>>,
    vars: Option<Extension<RequestVars>>,
) -> ApiResult<String> {
    let name = state.locale.variable_name();
    vars.and_then(|Extension(vars)| vars.get(name).map(str::to_string)).ok_or_else(|| {
        tracing::warn!("Request variable '{}' is not set", name);
        ApiError::LocaleMissing
    })
}

/// Detected locale with its parts and a localized greeting
#[utoipa::path(
    get,
    path = "/api/locale",
    responses(
        (status = 200, description = "Detected locale", body = LocaleResponse),
        (status = 500, description = "Locale detection is not mounted"),
    ),
    tag = "Locale"
)]
pub async fn get_locale(locale: ResolvedLocale) -> Json<LocaleResponse> {
    tracing::debug!("Describing detected locale {}", locale);
    let tag = locale.tag();

    Json(LocaleResponse {
        locale: locale.to_string(),
        language: tag.language().to_string(),
        region: tag.region().map(str::to_string),
        greeting: t!("greeting", locale = locale.as_str()).to_string(),
    })
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
