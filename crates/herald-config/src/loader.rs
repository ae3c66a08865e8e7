//! Layered configuration loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge the config file, if one is given and exists
//! 3. Apply env var fallbacks for fields the file did not set
//! 4. Deserialize merged tree → `Config`
//! 5. Validate
//! 6. Return `ResolvedConfig`

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::env::apply_env_fallbacks;
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load configuration from defaults, an optional file, and `env_vars`.
///
/// A missing file is not an error; the defaults and environment are used.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed, or if the
/// final merged configuration fails validation.
pub fn load<S: ::std::hash::BuildHasher>(
    path: Option<&Path>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged = parse_defaults()?;
    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();

    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    if let Some(path) = path
        && let Some(overlay) = try_load_file(path)?
    {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::File,
            &mut field_sources,
        );
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded config file");
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let config = deserialize(merged, "<merged config>")?;
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Parse a TOML document layered over the defaults, without environment
/// fallbacks.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the document does not parse or fails
/// validation.
pub fn from_toml_str(content: &str) -> ConfigResult<Config> {
    let mut merged = parse_defaults()?;
    let overlay: toml::Value = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: "<string>".to_owned(),
        source: e,
    })?;

    let mut ignored = FieldSources::new();
    deep_merge_tracking(&mut merged, &overlay, "", &ConfigLayer::File, &mut ignored);

    let config = deserialize(merged, "<string>")?;
    validate::validate(&config)?;
    Ok(config)
}

fn parse_defaults() -> ConfigResult<toml::Value> {
    toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_owned(),
        source: e,
    })
}

fn deserialize(merged: toml::Value, path: &str) -> ConfigResult<Config> {
    merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.to_owned(),
            source: e,
        })
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DispatcherKind, ExecutorKind};
    use std::io::Write;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_deserialize_to_default_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_without_file() {
        let resolved = load(None, &no_env()).unwrap();

        assert_eq!(resolved.config, Config::default());
        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("bus.identifier"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load(Some(dir.path().join("absent.toml").as_path()), &no_env()).unwrap();

        assert!(resolved.loaded_files.is_empty());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
            [bus]
            identifier = "payments"
            dispatcher = "immediate"
            "#,
        );

        let resolved = load(Some(file.path()), &no_env()).unwrap();

        assert_eq!(resolved.config.bus.identifier, "payments");
        assert_eq!(resolved.config.bus.dispatcher, DispatcherKind::Immediate);
        assert_eq!(resolved.config.bus.executor, ExecutorKind::Direct);
        assert_eq!(resolved.loaded_files.len(), 1);
    }

    #[test]
    fn test_precedence_file_then_env_then_defaults() {
        let file = write_config("[bus]\nidentifier = \"from-file\"\n");
        let env: HashMap<String, String> = [
            ("HERALD_BUS_IDENTIFIER", "from-env"),
            ("HERALD_EXECUTOR", "worker_pool"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let resolved = load(Some(file.path()), &env).unwrap();

        assert_eq!(resolved.config.bus.identifier, "from-file");
        assert_eq!(resolved.config.bus.executor, ExecutorKind::WorkerPool);
        assert_eq!(resolved.config.bus.dispatcher, DispatcherKind::PerThread);
        assert_eq!(
            resolved.field_sources.get("bus.executor"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let file = write_config("[bus\nidentifier = ");

        let error = load(Some(file.path()), &no_env()).unwrap_err();
        assert!(matches!(error, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_unknown_dispatcher_is_a_parse_error() {
        let error = from_toml_str("[bus]\ndispatcher = \"round_robin\"\n").unwrap_err();
        assert!(matches!(error, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_invalid_value_fails_validation() {
        let file = write_config("[logging]\nformat = \"xml\"\n");

        let error = load(Some(file.path()), &no_env()).unwrap_err();
        assert!(matches!(error, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_from_toml_str_layers_over_defaults() {
        let config = from_toml_str("[logging]\nlevel = \"debug\"\n").unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.bus.identifier, "default");
    }
}
