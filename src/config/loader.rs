//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// Variable selecting the environment label.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Environment label used when nothing else is set.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

/// Load feature toggles from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    tracing::debug!(path = %path.display(), ?config, "Configuration file loaded");
    Ok(config)
}

/// Read a process environment variable. Empty values count as unset.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Resolve the environment label: explicit override, then `APP_ENV`
/// through `lookup`, then `"development"`.
pub fn resolve_environment<F>(explicit: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .map(str::to_string)
        .or_else(|| lookup(ENVIRONMENT_VAR))
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn environment_defaults_to_development() {
        assert_eq!(resolve_environment(None, |_| None), "development");
    }

    #[test]
    fn environment_reads_variable() {
        let env = resolve_environment(None, |key| {
            (key == ENVIRONMENT_VAR).then(|| "test".to_string())
        });
        assert_eq!(env, "test");
    }

    #[test]
    fn explicit_environment_wins() {
        let env = resolve_environment(Some("staging"), |_| Some("test".to_string()));
        assert_eq!(env, "staging");
    }

    #[test]
    fn loads_toggles_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "databaseEnabled = false\nwebsocketEnabled = true").unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(!config.database_enabled);
        assert!(config.websocket_enabled);
        assert!(config.logs_enabled);
    }

    #[test]
    fn rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "corsEnabled = \"yes please\"").unwrap();

        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
