//! Locale detection middleware
//!
//! Collects the client's locale preferences from the configured sources,
//! matches them against the supported locales and exposes the result to the
//! rest of the pipeline. Never fails the request: every problem degrades to
//! the configured default locale.

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{ACCEPT_LANGUAGE, COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use cookie::Cookie;

use super::{PipelineHandler, RequestVars};
use crate::config::LocaleSettings;
use crate::locale::{LocaleTag, match_locale, parse_accept_language, parse_cookie_value};
use crate::utils::{ApiError, ConfigError, localize_response};

/// A request signal carrying locale preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleSource {
    /// A cookie holding one locale tag
    Cookie,
    /// The `Accept-Language` header
    Header,
}

impl LocaleSource {
    /// Tags this source contributes, highest preference first.
    ///
    /// Absent or malformed values contribute nothing.
    pub fn collect(&self, headers: &HeaderMap, cookie_name: &str) -> Vec<LocaleTag> {
        match self {
            Self::Cookie => find_cookie(headers, cookie_name)
                .and_then(|value| parse_cookie_value(&value))
                .into_iter()
                .collect(),
            Self::Header => headers
                .get_all(ACCEPT_LANGUAGE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .flat_map(parse_accept_language)
                .collect(),
        }
    }
}

impl FromStr for LocaleSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cookie" => Ok(Self::Cookie),
            "header" => Ok(Self::Header),
            _ => Err(ConfigError::UnknownSource(s.to_string())),
        }
    }
}

/// Where the resolved locale gets written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleOutput {
    /// Header on the request seen by later stages
    RequestHeader,
    /// Same header on the response sent to the client
    ResponseHeader,
    /// Named entry in [`RequestVars`] plus a typed [`ResolvedLocale`] extension
    Variable,
}

impl FromStr for LocaleOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "request_header" => Ok(Self::RequestHeader),
            "response_header" => Ok(Self::ResponseHeader),
            "variable" => Ok(Self::Variable),
            _ => Err(ConfigError::UnknownOutput(s.to_string())),
        }
    }
}

/// Validated, immutable middleware configuration shared by all requests
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    available: Vec<LocaleTag>,
    sources: Vec<LocaleSource>,
    cookie_name: String,
    header_name: HeaderName,
    variable_name: String,
    outputs: Vec<LocaleOutput>,
}

impl LocaleConfig {
    /// Build the request-time configuration from the raw `[locale]` section
    pub fn from_settings(settings: &LocaleSettings) -> Result<Self, ConfigError> {
        let available = settings
            .available
            .iter()
            .map(|raw| LocaleTag::try_parse(raw).ok_or_else(|| ConfigError::InvalidLocale(raw.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        if available.is_empty() {
            tracing::warn!("No available locales configured, every request resolves to 'und'");
        }

        let sources =
            settings.sources.iter().map(|s| s.parse()).collect::<Result<Vec<LocaleSource>, _>>()?;
        if sources.is_empty() {
            tracing::warn!("No locale sources configured, every request resolves to the default");
        }

        let outputs =
            settings.outputs.iter().map(|s| s.parse()).collect::<Result<Vec<LocaleOutput>, _>>()?;

        let cookie_name = settings.cookie_name.trim();
        if !is_token(cookie_name) {
            return Err(ConfigError::InvalidCookieName(settings.cookie_name.clone()));
        }

        let header_name = HeaderName::from_bytes(settings.header_name.trim().as_bytes())
            .map_err(|_| ConfigError::InvalidHeaderName(settings.header_name.clone()))?;

        let variable_name = settings.variable_name.trim();
        if variable_name.is_empty() || variable_name.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidVariableName(settings.variable_name.clone()));
        }

        Ok(Self {
            available,
            sources,
            cookie_name: cookie_name.to_string(),
            header_name,
            variable_name: variable_name.to_string(),
            outputs,
        })
    }

    pub fn available(&self) -> &[LocaleTag] {
        &self.available
    }

    pub fn sources(&self) -> &[LocaleSource] {
        &self.sources
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    pub fn outputs(&self) -> &[LocaleOutput] {
        &self.outputs
    }

    /// First available locale, or `und` when none are configured
    pub fn default_locale(&self) -> LocaleTag {
        self.available.first().cloned().unwrap_or_else(LocaleTag::unknown)
    }

    fn writes(&self, output: LocaleOutput) -> bool {
        self.outputs.contains(&output)
    }
}

/// The locale chosen for one request, in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocale {
    tag: LocaleTag,
    canonical: String,
}

impl ResolvedLocale {
    pub fn new(tag: LocaleTag) -> Self {
        let canonical = tag.to_canonical_string();
        Self { tag, canonical }
    }

    pub fn tag(&self) -> &LocaleTag {
        &self.tag
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for ResolvedLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ResolvedLocale
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<ResolvedLocale>().cloned().ok_or(ApiError::LocaleMissing)
    }
}

/// Gather requested tags from every configured source, in configured order
pub fn collect_requested(config: &LocaleConfig, headers: &HeaderMap) -> Vec<LocaleTag> {
    config.sources.iter().flat_map(|source| source.collect(headers, &config.cookie_name)).collect()
}

/// Resolve the locale for a request's headers
pub fn resolve(config: &LocaleConfig, headers: &HeaderMap) -> ResolvedLocale {
    let requested = collect_requested(config, headers);
    let tag = match_locale(&config.available, &requested);

    tracing::debug!(
        "Resolved locale {} from {} requested tag(s) {:?}",
        tag,
        requested.len(),
        requested.iter().map(LocaleTag::to_string).collect::<Vec<_>>()
    );

    ResolvedLocale::new(tag)
}

/// Header value for the resolved locale, falling back to the default locale
fn header_value(config: &LocaleConfig, resolved: &ResolvedLocale) -> Option<HeaderValue> {
    HeaderValue::from_str(resolved.as_str())
        .or_else(|err| {
            tracing::warn!("Cannot use '{}' as a header value: {}", resolved, err);
            HeaderValue::from_str(&config.default_locale().to_canonical_string())
        })
        .ok()
}

/// Middleware resolving the client's locale and exposing it downstream.
///
/// Error responses produced further down are rendered in the resolved locale.
pub async fn locale_middleware(
    State(config): State<Arc<LocaleConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let resolved = resolve(&config, req.headers());
    let value = header_value(&config, &resolved);

    if config.writes(LocaleOutput::RequestHeader)
        && let Some(value) = value.clone()
    {
        req.headers_mut().insert(config.header_name.clone(), value);
    }

    if config.writes(LocaleOutput::Variable) {
        let extensions = req.extensions_mut();
        if let Some(vars) = extensions.get_mut::<RequestVars>() {
            vars.set(config.variable_name.as_str(), resolved.as_str());
        } else {
            let mut vars = RequestVars::default();
            vars.set(config.variable_name.as_str(), resolved.as_str());
            extensions.insert(vars);
        }
        extensions.insert(resolved.clone());
    }

    let mut response = localize_response(next.run(req).await, resolved.as_str());

    if config.writes(LocaleOutput::ResponseHeader)
        && let Some(value) = value
    {
        response.headers_mut().insert(config.header_name.clone(), value);
    }

    response
}

/// Locale detection registered as a pipeline stage
pub struct LocaleHandler;

impl PipelineHandler for LocaleHandler {
    type Settings = LocaleSettings;
    type Config = LocaleConfig;

    fn configure(settings: &LocaleSettings) -> Result<LocaleConfig, ConfigError> {
        LocaleConfig::from_settings(settings)
    }

    async fn serve(config: State<Arc<LocaleConfig>>, req: Request, next: Next) -> Response {
        locale_middleware(config, req, next).await
    }
}

fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// RFC 6265 cookie-name token
fn is_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
}
