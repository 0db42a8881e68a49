use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

use detect_locale::config::{Config, LoggingConfig};
use detect_locale::middleware::{LocaleHandler, PipelineHandler};
use detect_locale::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "detect-locale", version, about = "Locale detection server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref(), std::io::stdout)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let _guard = init_logging(&config.logging)?;

    let locale = LocaleHandler::configure(&config.locale)?;
    tracing::info!(
        "Locale detection: available={:?} sources={:?} outputs={:?}",
        locale.available().iter().map(ToString::to_string).collect::<Vec<_>>(),
        locale.sources(),
        locale.outputs()
    );
    rust_i18n::set_locale(&locale.default_locale().to_canonical_string());

    let app = build_router(Arc::new(AppState::new(locale)));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Load configuration under a temporary console subscriber.
///
/// The configured logging needs the loaded configuration, so warnings and
/// overrides reported while loading go to `writer` instead.
fn load_config<W>(path: Option<&str>, writer: W) -> Result<Config>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let bootstrap = fmt().with_env_filter(filter).with_writer(writer).finish();

    tracing::subscriber::with_default(bootstrap, || Config::load(path))
        .context("Failed to load configuration")
}

/// Console logging, plus a daily rolling file when `logging.file` is set
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&logging.level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    match &logging.file {
        Some(file) => {
            let path = Path::new(file);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().context("logging.file has no file name")?;

            let appender = tracing_appender::rolling::daily(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            registry.with(fmt::layer().with_writer(writer).with_ansi(false)).init();
            Ok(Some(guard))
        },
        None => {
            registry.init();
            Ok(None)
        },
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
