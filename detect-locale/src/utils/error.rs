use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// These are surfaced at startup (or reload) and never at request time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown locale source '{0}' (expected 'cookie' or 'header')")]
    UnknownSource(String),

    #[error("Unknown locale output '{0}' (expected 'request_header', 'response_header' or 'variable')")]
    UnknownOutput(String),

    #[error("Invalid available locale '{0}'")]
    InvalidLocale(String),

    #[error("Invalid header name '{0}'")]
    InvalidHeaderName(String),

    #[error("Invalid cookie name '{0}'")]
    InvalidCookieName(String),

    #[error("Invalid variable name '{0}'")]
    InvalidVariableName(String),

    #[error("Server port cannot be 0")]
    InvalidPort,

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// API error for the HTTP handlers served next to the middleware
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Detected locale is missing from the request")]
    LocaleMissing,

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// Helper to create not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound(message.into())
    }

    /// Helper to create internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    pub fn error_code(&self) -> i32 {
        match self {
            Self::ResourceNotFound(_) => 3000,
            Self::LocaleMissing => 5001,
            Self::InternalError(_) | Self::Other(_) => 5002,
        }
    }

    /// Error message in the given locale, falling back to English
    pub fn localized_message(&self, locale: &str) -> String {
        match self {
            Self::LocaleMissing => t!("locale.missing", locale = locale).to_string(),
            Self::ResourceNotFound(name) => {
                t!("resource.not_found", locale = locale, name = name).to_string()
            },
            Self::InternalError(msg) => {
                t!("internal.error", locale = locale, message = msg).to_string()
            },
            Self::Other(err) => {
                t!("internal.error", locale = locale, message = err.to_string()).to_string()
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: i32,
    pub message: String,
}

impl IntoResponse for ApiError {
    /// Renders in the process default locale. The error is kept in the
    /// response extensions so [`localize_response`] can re-render it for the
    /// locale detected on the request.
    fn into_response(self) -> Response {
        let code = self.error_code();
        let message = self.localized_message(&rust_i18n::locale());

        let status = match code {
            3000..=3999 => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut response = (status, Json(ApiErrorResponse { code, message })).into_response();
        response.extensions_mut().insert(Arc::new(self));
        response
    }
}

/// Rewrite an [`ApiError`] response body in `locale`; other responses pass through
pub fn localize_response(response: Response, locale: &str) -> Response {
    let Some(error) = response.extensions().get::<Arc<ApiError>>().cloned() else {
        return response;
    };

    let body = ApiErrorResponse { code: error.error_code(), message: error.localized_message(locale) };
    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Json(body).into_response().into_body())
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::not_found("x").error_code(), 3000);
        assert_eq!(ApiError::LocaleMissing.error_code(), 5001);
        assert_eq!(ApiError::internal_error("boom").error_code(), 5002);
    }

    #[test]
    fn test_localized_message() {
        let err = ApiError::not_found("/nope");
        assert_eq!(err.localized_message("en"), "Resource not found: /nope");
        assert_eq!(err.localized_message("fr"), "Ressource introuvable : /nope");
        // unsupported locales use the English fallback
        assert_eq!(err.localized_message("xx"), "Resource not found: /nope");
    }

    #[test]
    fn test_into_response_status() {
        assert_eq!(ApiError::not_found("x").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::LocaleMissing.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_keeps_error() {
        let response = ApiError::not_found("/nope").into_response();
        let error = response.extensions().get::<Arc<ApiError>>().unwrap();
        assert_eq!(error.localized_message("de"), "Ressource nicht gefunden: /nope");
    }

    #[test]
    fn test_localize_response_passes_other_responses() {
        let response = localize_response((StatusCode::OK, "fine").into_response(), "fr");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.extensions().get::<Arc<ApiError>>().is_none());
    }
}
