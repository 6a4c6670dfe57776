use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use swimfit_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: Vec<(&str, String, &str)> = vec![
        ("database.url", config.database.url.clone(), "SWIMFIT_DATABASE_URL"),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            "SWIMFIT_DATABASE_MAX_CONNECTIONS",
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "SWIMFIT_DATABASE_TIMEOUT_SECS",
        ),
        (
            "analytics.backend",
            config.analytics.backend.as_str().to_string(),
            "SWIMFIT_ANALYTICS_BACKEND",
        ),
        (
            "analytics.rest_url",
            config.analytics.rest_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            "SWIMFIT_ANALYTICS_REST_URL",
        ),
        (
            "analytics.api_key",
            redact_secret(config.analytics.api_key.as_ref()),
            "SWIMFIT_ANALYTICS_API_KEY",
        ),
        ("analytics.table", config.analytics.table.clone(), "SWIMFIT_ANALYTICS_TABLE"),
        (
            "analytics.timeout_secs",
            config.analytics.timeout_secs.to_string(),
            "SWIMFIT_ANALYTICS_TIMEOUT_SECS",
        ),
        (
            "engine.length_unit",
            config.engine.length_unit.as_str().to_string(),
            "SWIMFIT_ENGINE_LENGTH_UNIT",
        ),
        (
            "engine.default_unit_system",
            config.engine.default_unit_system.as_str().to_string(),
            "SWIMFIT_ENGINE_DEFAULT_UNIT_SYSTEM",
        ),
        (
            "engine.size_chart_path",
            config
                .engine
                .size_chart_path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<built-in>".to_string()),
            "SWIMFIT_ENGINE_SIZE_CHART_PATH",
        ),
        ("server.bind_address", config.server.bind_address.clone(), "SWIMFIT_SERVER_BIND_ADDRESS"),
        ("server.port", config.server.port.to_string(), "SWIMFIT_SERVER_PORT"),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            "SWIMFIT_SERVER_GRACEFUL_SHUTDOWN_SECS",
        ),
        (
            "server.allowed_origins",
            if config.server.allowed_origins.is_empty() {
                "<any>".to_string()
            } else {
                config.server.allowed_origins.join(",")
            },
            "SWIMFIT_SERVER_ALLOWED_ORIGINS",
        ),
        ("logging.level", config.logging.level.clone(), "SWIMFIT_LOGGING_LEVEL"),
        ("logging.format", format!("{:?}", config.logging.format), "SWIMFIT_LOGGING_FORMAT"),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in &fields {
        lines.push(render_line(
            key,
            value,
            field_source(key, Some(env_key), config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    }

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("swimfit.toml"), PathBuf::from("config/swimfit.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the last four characters of long keys so operators can tell keys apart.
fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };

    let value = secret.expose_secret().trim();
    if value.is_empty() {
        return "<empty>".to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 12 {
        return "<redacted>".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::redact_secret;

    #[test]
    fn secrets_are_never_printed_whole() {
        let long: SecretString = "service-role-key-abcd".to_string().into();
        let short: SecretString = "tiny".to_string().into();

        assert_eq!(redact_secret(Some(&long)), "***abcd");
        assert_eq!(redact_secret(Some(&short)), "<redacted>");
        assert_eq!(redact_secret(None), "<unset>");
    }
}
