pub mod locale;
pub mod vars;

use std::{future::Future, sync::Arc};

use axum::{Router, extract::Request, extract::State, middleware::Next, response::Response};

use crate::utils::ConfigError;

pub use locale::{LocaleConfig, LocaleHandler, ResolvedLocale, locale_middleware, resolve};
pub use vars::RequestVars;

/// A request-processing stage the host pipeline can configure and invoke.
///
/// `configure` runs once at startup (or reload) and rejects bad settings;
/// `serve` runs per request with the shared, read-only configuration and must
/// hand control to `next`.
pub trait PipelineHandler: Send + Sync + 'static {
    type Settings;
    type Config: Send + Sync + 'static;

    fn configure(settings: &Self::Settings) -> Result<Self::Config, ConfigError>;

    fn serve(
        config: State<Arc<Self::Config>>,
        req: Request,
        next: Next,
    ) -> impl Future<Output = Response> + Send;
}

/// Mount a configured handler in front of every route of `router`
pub fn mount<H, S>(router: Router<S>, config: Arc<H::Config>) -> Router<S>
where
    H: PipelineHandler,
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn_with_state(config, H::serve))
}
