use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::measurement::{LengthUnit, UnitSystem};

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub analytics: AnalyticsConfig,
    pub engine: EngineConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    pub backend: AnalyticsBackend,
    pub rest_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub table: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub length_unit: LengthUnit,
    pub default_unit_system: UnitSystem,
    pub size_chart_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsBackend {
    Disabled,
    Sqlite,
    Rest,
}

impl AnalyticsBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Sqlite => "sqlite",
            Self::Rest => "rest",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub analytics_backend: Option<AnalyticsBackend>,
    pub analytics_rest_url: Option<String>,
    pub analytics_api_key: Option<String>,
    pub length_unit: Option<LengthUnit>,
    pub size_chart_path: Option<PathBuf>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Table created by the embedded migrations; the sqlite backend always writes here.
pub const SQLITE_ANALYTICS_TABLE: &str = "fit_analytics";

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://swimfit.db".to_string(), max_connections: 5, timeout_secs: 30 }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            backend: AnalyticsBackend::Disabled,
            rest_url: None,
            api_key: None,
            table: SQLITE_ANALYTICS_TABLE.to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            graceful_shutdown_secs: 15,
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for AnalyticsBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "sqlite" => Ok(Self::Sqlite),
            "rest" => Ok(Self::Rest),
            other => Err(ConfigError::Validation(format!(
                "unsupported analytics backend `{other}` (expected disabled|sqlite|rest)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("swimfit.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(analytics) = patch.analytics {
            if let Some(backend) = analytics.backend {
                self.analytics.backend = backend;
            }
            if let Some(rest_url) = analytics.rest_url {
                self.analytics.rest_url = Some(rest_url);
            }
            if let Some(analytics_api_key_value) = analytics.api_key {
                self.analytics.api_key = Some(secret_value(analytics_api_key_value));
            }
            if let Some(table) = analytics.table {
                self.analytics.table = table;
            }
            if let Some(timeout_secs) = analytics.timeout_secs {
                self.analytics.timeout_secs = timeout_secs;
            }
        }

        if let Some(engine) = patch.engine {
            if let Some(length_unit) = engine.length_unit {
                self.engine.length_unit = length_unit;
            }
            if let Some(default_unit_system) = engine.default_unit_system {
                self.engine.default_unit_system = default_unit_system;
            }
            if let Some(size_chart_path) = engine.size_chart_path {
                self.engine.size_chart_path = Some(size_chart_path);
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(allowed_origins) = server.allowed_origins {
                self.server.allowed_origins = allowed_origins;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SWIMFIT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SWIMFIT_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("SWIMFIT_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SWIMFIT_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("SWIMFIT_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SWIMFIT_ANALYTICS_BACKEND") {
            self.analytics.backend = value.parse()?;
        }
        if let Some(value) = read_env("SWIMFIT_ANALYTICS_REST_URL") {
            self.analytics.rest_url = Some(value);
        }
        if let Some(value) = read_env("SWIMFIT_ANALYTICS_API_KEY") {
            self.analytics.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SWIMFIT_ANALYTICS_TABLE") {
            self.analytics.table = value;
        }
        if let Some(value) = read_env("SWIMFIT_ANALYTICS_TIMEOUT_SECS") {
            self.analytics.timeout_secs = parse_u64("SWIMFIT_ANALYTICS_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SWIMFIT_ENGINE_LENGTH_UNIT") {
            self.engine.length_unit = parse_length_unit("SWIMFIT_ENGINE_LENGTH_UNIT", &value)?;
        }
        if let Some(value) = read_env("SWIMFIT_ENGINE_DEFAULT_UNIT_SYSTEM") {
            self.engine.default_unit_system =
                parse_unit_system("SWIMFIT_ENGINE_DEFAULT_UNIT_SYSTEM", &value)?;
        }
        if let Some(value) = read_env("SWIMFIT_ENGINE_SIZE_CHART_PATH") {
            self.engine.size_chart_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("SWIMFIT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SWIMFIT_SERVER_PORT") {
            self.server.port = parse_u16("SWIMFIT_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SWIMFIT_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SWIMFIT_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("SWIMFIT_SERVER_ALLOWED_ORIGINS") {
            self.server.allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect();
        }

        let log_level = read_env("SWIMFIT_LOGGING_LEVEL").or_else(|| read_env("SWIMFIT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SWIMFIT_LOGGING_FORMAT").or_else(|| read_env("SWIMFIT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(backend) = overrides.analytics_backend {
            self.analytics.backend = backend;
        }
        if let Some(rest_url) = overrides.analytics_rest_url {
            self.analytics.rest_url = Some(rest_url);
        }
        if let Some(analytics_api_key) = overrides.analytics_api_key {
            self.analytics.api_key = Some(secret_value(analytics_api_key));
        }
        if let Some(length_unit) = overrides.length_unit {
            self.engine.length_unit = length_unit;
        }
        if let Some(size_chart_path) = overrides.size_chart_path {
            self.engine.size_chart_path = Some(size_chart_path);
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_analytics(&self.analytics)?;
        validate_engine(&self.engine)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("swimfit.toml"), PathBuf::from("config/swimfit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_analytics(analytics: &AnalyticsConfig) -> Result<(), ConfigError> {
    if analytics.timeout_secs == 0 || analytics.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "analytics.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    let table = analytics.table.trim();
    let table_ok = !table.is_empty()
        && table.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !table_ok {
        return Err(ConfigError::Validation(
            "analytics.table must be a non-empty identifier of letters, digits, or `_`"
                .to_string(),
        ));
    }

    if analytics.backend == AnalyticsBackend::Sqlite && table != SQLITE_ANALYTICS_TABLE {
        return Err(ConfigError::Validation(format!(
            "analytics.table `{table}` is only supported by the rest backend; the sqlite backend \
             uses `{SQLITE_ANALYTICS_TABLE}`"
        )));
    }

    if analytics.backend == AnalyticsBackend::Rest {
        let rest_url = analytics.rest_url.as_deref().map(str::trim).unwrap_or_default();
        if !rest_url.starts_with("http://") && !rest_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "analytics.rest_url must start with http:// or https:// for the rest backend"
                    .to_string(),
            ));
        }

        let missing_key = analytics
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing_key {
            return Err(ConfigError::Validation(
                "analytics.api_key is required for the rest backend".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_engine(engine: &EngineConfig) -> Result<(), ConfigError> {
    if let Some(path) = &engine.size_chart_path {
        if !path.exists() {
            return Err(ConfigError::Validation(format!(
                "engine.size_chart_path `{}` does not exist",
                path.display()
            )));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    for origin in &server.allowed_origins {
        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "server.allowed_origins entry `{origin}` must start with http:// or https://"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_length_unit(key: &str, value: &str) -> Result<LengthUnit, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cm" => Ok(LengthUnit::Centimeters),
        "in" => Ok(LengthUnit::Inches),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_unit_system(key: &str, value: &str) -> Result<UnitSystem, ConfigError> {
    UnitSystem::parse_lenient(value).ok_or_else(|| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    analytics: Option<AnalyticsPatch>,
    engine: Option<EnginePatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsPatch {
    backend: Option<AnalyticsBackend>,
    rest_url: Option<String>,
    api_key: Option<String>,
    table: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct EnginePatch {
    length_unit: Option<LengthUnit>,
    default_unit_system: Option<UnitSystem>,
    size_chart_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
