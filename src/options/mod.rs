//! Runtime configuration with TOML preset support.
//!
//! Options serialize to/from TOML so a renderer can ship presets (for
//! example a "compat" preset that disables vertex array objects on drivers
//! known to mishandle them).

mod context;

use std::path::Path;

pub use context::ContextOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::TileGpuError;

/// Top-level options container. Sub-structs use `#[serde(default)]` so
/// partial TOML files work.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// GPU context behavior.
    pub context: ContextOptions,
}

impl Options {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TileGpuError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, TileGpuError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`TileGpuError::OptionsParse`] on malformed TOML.
    pub fn from_toml(content: &str) -> Result<Self, TileGpuError> {
        toml::from_str(content)
            .map_err(|e| TileGpuError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`TileGpuError`] if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), TileGpuError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TileGpuError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[context]
use_vertex_array_objects = false
";
        let opts = Options::from_toml(toml_str).unwrap();
        assert!(!opts.context.use_vertex_array_objects);
        assert!(opts.context.elide_redundant_bindings);
        assert_eq!(opts.context.label, "tilegpu");
    }

    #[test]
    fn malformed_toml_is_an_options_error() {
        let err = Options::from_toml("[context\n").unwrap_err();
        assert!(matches!(err, TileGpuError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load_and_list() {
        let dir = std::env::temp_dir()
            .join(format!("tilegpu-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.context.elide_redundant_bindings = false;
        opts.save(&dir.join("debug.toml")).unwrap();
        Options::default().save(&dir.join("compat.toml")).unwrap();

        let loaded = Options::load(&dir.join("debug.toml")).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["compat", "debug"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_names_context_options() {
        let schema = Options::json_schema();
        let rendered = format!("{schema:?}");
        assert!(rendered.contains("use_vertex_array_objects"));
    }
}
