use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::middleware::locale::LocaleConfig;
use crate::utils::ConfigError;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub locale: LocaleSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Raw `[locale]` section, validated into a [`LocaleConfig`]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocaleSettings {
    /// Supported locales; the first one is the default
    pub available: Vec<String>,
    /// Where to look for the client's preference, in order (`cookie`, `header`)
    pub sources: Vec<String>,
    pub cookie_name: String,
    pub header_name: String,
    pub variable_name: String,
    /// Where to write the result (`request_header`, `response_header`, `variable`)
    pub outputs: Vec<String>,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from the given path, or conf/config.toml / config.toml
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.map(str::to_string).or_else(Self::find_config_file);

        let mut config = if let Some(config_path) = path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,detect_locale=debug")
    /// - APP_LOG_FILE: Log file path
    /// - APP_LOCALE_AVAILABLE: Comma separated supported locales (e.g., "en,fr,de")
    /// - APP_LOCALE_SOURCES: Comma separated sources (e.g., "cookie,header")
    /// - APP_LOCALE_COOKIE_NAME: Cookie holding the user's choice (default: lang)
    /// - APP_LOCALE_HEADER_NAME: Header receiving the result (default: Detected-Locale)
    /// - APP_LOCALE_VARIABLE_NAME: Request variable receiving the result (default: detected-locale)
    /// - APP_LOCALE_OUTPUTS: Comma separated outputs (e.g., "request_header,variable")
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Some(port) = var("APP_SERVER_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.server.port = port;
                    tracing::info!("Override server.port from env: {}", self.server.port);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_SERVER_PORT '{}': {} (keep {})",
                    port,
                    e,
                    self.server.port
                ),
            }
        }

        if let Some(level) = var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Some(file) = var("APP_LOG_FILE") {
            self.logging.file = if file.trim().is_empty() { None } else { Some(file) };
            tracing::info!("Override logging.file from env: {:?}", self.logging.file);
        }

        if let Some(available) = var("APP_LOCALE_AVAILABLE") {
            self.locale.available = split_list(&available);
            tracing::info!("Override locale.available from env: {:?}", self.locale.available);
        }

        if let Some(sources) = var("APP_LOCALE_SOURCES") {
            self.locale.sources = split_list(&sources);
            tracing::info!("Override locale.sources from env: {:?}", self.locale.sources);
        }

        if let Some(name) = var("APP_LOCALE_COOKIE_NAME") {
            set_name(&mut self.locale.cookie_name, name, "locale.cookie_name");
        }

        if let Some(name) = var("APP_LOCALE_HEADER_NAME") {
            set_name(&mut self.locale.header_name, name, "locale.header_name");
        }

        if let Some(name) = var("APP_LOCALE_VARIABLE_NAME") {
            set_name(&mut self.locale.variable_name, name, "locale.variable_name");
        }

        if let Some(outputs) = var("APP_LOCALE_OUTPUTS") {
            self.locale.outputs = split_list(&outputs);
            tracing::info!("Override locale.outputs from env: {:?}", self.locale.outputs);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        // Builds the request-time configuration once to surface its errors now
        LocaleConfig::from_settings(&self.locale)?;

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        possible_paths.iter().find(|path| Path::new(path).exists()).map(|path| path.to_string())
    }

    pub fn from_toml(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_string(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,detect_locale=debug".to_string(), file: None }
    }
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            available: Vec::new(),
            sources: vec!["header".to_string()],
            cookie_name: "lang".to_string(),
            header_name: "Detected-Locale".to_string(),
            variable_name: "detected-locale".to_string(),
            outputs: vec!["request_header".to_string(), "variable".to_string()],
        }
    }
}

fn split_list(input: &str) -> Vec<String> {
    input.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

fn set_name(target: &mut String, value: String, field: &str) {
    let value = value.trim();
    if value.is_empty() {
        tracing::warn!("Ignoring empty override for {} (keep {})", field, target);
        return;
    }
    *target = value.to_string();
    tracing::info!("Override {} from env: {}", field, target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.locale.sources, vec!["header"]);
        assert_eq!(config.locale.cookie_name, "lang");
        assert_eq!(config.locale.header_name, "Detected-Locale");
        assert_eq!(config.locale.variable_name, "detected-locale");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9080

            [locale]
            available = ["en", "fr", "de"]
            sources = ["cookie", "header"]
            cookie_name = "site_lang"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.locale.available, vec!["en", "fr", "de"]);
        assert_eq!(config.locale.sources, vec!["cookie", "header"]);
        assert_eq!(config.locale.cookie_name, "site_lang");
        assert_eq!(config.locale.header_name, "Detected-Locale");
    }

    #[test]
    fn test_from_toml_str_rejects_bad_types() {
        assert!(matches!(
            Config::from_toml_str("[server]\nport = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[
            ("APP_SERVER_PORT", "9090"),
            ("APP_LOCALE_AVAILABLE", "en, fr ,,de"),
            ("APP_LOCALE_SOURCES", "cookie,header"),
            ("APP_LOCALE_HEADER_NAME", "X-Locale"),
            ("APP_LOCALE_COOKIE_NAME", "  "),
            ("APP_LOG_FILE", ""),
        ]));

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.locale.available, vec!["en", "fr", "de"]);
        assert_eq!(config.locale.sources, vec!["cookie", "header"]);
        assert_eq!(config.locale.header_name, "X-Locale");
        assert_eq!(config.locale.cookie_name, "lang");
        assert_eq!(config.logging.file, None);
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(overrides(&[("APP_SERVER_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort)));
    }

    #[test]
    fn test_validate_rejects_unknown_source() {
        let mut config = Config::default();
        config.locale.sources = vec!["header".to_string(), "query".to_string()];
        match config.validate() {
            Err(ConfigError::UnknownSource(source)) => assert_eq!(source, "query"),
            other => panic!("expected unknown source error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some("/nonexistent/detect-locale.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
