//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Accepted `logging.level` values.
pub const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Accepted `logging.format` values.
pub const VALID_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_bus(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_bus(config: &Config) -> ConfigResult<()> {
    let identifier = &config.bus.identifier;

    if identifier.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "bus.identifier".to_owned(),
            message: "identifier must not be empty".to_owned(),
        });
    }

    if identifier.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError {
            field: "bus.identifier".to_owned(),
            message: format!("identifier '{identifier}' must not contain whitespace"),
        });
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    if !VALID_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                VALID_LEVELS.join(", ")
            ),
        });
    }

    if !VALID_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                VALID_FORMATS.join(", ")
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_identifier() {
        let mut config = Config::default();
        config.bus.identifier = String::new();
        assert_eq!(field_of(validate(&config)), "bus.identifier");
    }

    #[test]
    fn test_identifier_with_whitespace() {
        let mut config = Config::default();
        config.bus.identifier = "my bus".to_owned();
        assert_eq!(field_of(validate(&config)), "bus.identifier");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");
    }

    #[test]
    fn test_off_level_is_accepted() {
        let mut config = Config::default();
        config.logging.level = "off".to_owned();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }
}
