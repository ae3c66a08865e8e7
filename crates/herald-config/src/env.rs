//! Environment variable fallback.
//!
//! Environment variables are a **fallback**, not an override: they only apply
//! to fields that no config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `HERALD_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "HERALD_BUS_IDENTIFIER",
        field_path: "bus.identifier",
    },
    EnvMapping {
        var_name: "HERALD_DISPATCHER",
        field_path: "bus.dispatcher",
    },
    EnvMapping {
        var_name: "HERALD_EXECUTOR",
        field_path: "bus.executor",
    },
    EnvMapping {
        var_name: "HERALD_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "HERALD_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply environment variable fallbacks to fields that no config file set.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let set_by_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer == ConfigLayer::File);
        if set_by_file {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );

            if set_field(merged, mapping.field_path, val) {
                sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
                count = count.saturating_add(1);
            }
        }
    }

    count
}

/// Set a dotted-path string field in the TOML tree, creating parent tables.
///
/// Returns `false` if a non-table value sits where a parent table belongs.
fn set_field(root: &mut toml::Value, path: &str, val: &str) -> bool {
    let mut segments = path.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        let Some(table) = current.as_table_mut() else {
            return false;
        };

        if segments.peek().is_none() {
            table.insert(segment.to_owned(), toml::Value::String(val.to_owned()));
            return true;
        }

        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    false
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
