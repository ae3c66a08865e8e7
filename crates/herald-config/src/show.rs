//! Resolved configuration display.

use std::fmt::Write as _;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded.
    pub loaded_files: Vec<String>,
}

/// Output format for [`ResolvedConfig::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing each field's source.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Layer that set `field` (a dotted path such as `bus.dispatcher`).
    #[must_use]
    pub fn source_of(&self, field: &str) -> Option<&ConfigLayer> {
        self.field_sources.get(field)
    }

    /// Render the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RenderError`] if serialization fails.
    pub fn show(&self, format: ShowFormat) -> ConfigResult<String> {
        match format {
            ShowFormat::Toml => self.show_toml(),
            ShowFormat::Json => {
                serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::RenderError {
                    format: "json",
                    message: e.to_string(),
                })
            },
        }
    }

    fn show_toml(&self) -> ConfigResult<String> {
        let rendered =
            toml::to_string_pretty(&self.config).map_err(|e| ConfigError::RenderError {
                format: "toml",
                message: e.to_string(),
            })?;

        let mut output = String::from("# Resolved Herald configuration\n");
        for path in &self.loaded_files {
            let _ = writeln!(output, "# loaded: {path}");
        }
        output.push('\n');

        let mut section = String::new();
        for line in rendered.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                name.clone_into(&mut section);
            }

            match annotation_key(trimmed, &section).and_then(|key| self.source_of(&key)) {
                Some(layer) => {
                    let _ = writeln!(output, "{line}  # [{layer}]");
                },
                None => {
                    output.push_str(line);
                    output.push('\n');
                },
            }
        }

        Ok(output)
    }
}

/// Dotted path of a `key = value` line inside `section`.
fn annotation_key(line: &str, section: &str) -> Option<String> {
    if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
        return None;
    }

    let key = line.split('=').next()?.trim();
    if section.is_empty() {
        Some(key.to_owned())
    } else {
        Some(format!("{section}.{key}"))
    }
}
