//! Shared configuration loader for desugarcube.
//!
//! `defaults/desugarcube.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. Callers layer user files and CLI overrides on top of
//! those defaults via [`Loader`] before deserializing into [`DesugarcubeConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use desugarcube_parser::ParseOptions;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/desugarcube.default.toml");

/// File name picked up from the working directory when present
pub const LOCAL_CONFIG_FILE: &str = "desugarcube.toml";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DesugarcubeConfig {
    pub parse: ParseOptions,
    pub output: OutputConfig,
}

/// How the JSON output is rendered and where it goes
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
    pub extension: String,
}

/// Layers user files and CLI overrides over the built-in defaults
#[derive(Debug)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

#[allow(clippy::new_without_default)]
impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file that must exist
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Layer a configuration file, skipped when absent
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one key, e.g. `output.pretty` from a CLI flag
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<DesugarcubeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = Loader::new().build().expect("defaults to deserialize");
        assert_eq!(config.parse, ParseOptions::default());
        assert!(!config.output.pretty);
        assert_eq!(config.output.extension, "json");
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("output.pretty", true)
            .expect("override to apply")
            .set_override("parse.lenient_markup", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.output.pretty);
        assert!(config.parse.lenient_markup);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            "[parse]\npassage_exclude = [\"position\"]\n\n[output]\nextension = \"story.json\""
        )
        .unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.parse.passage_exclude, vec!["position".to_string()]);
        assert_eq!(config.parse.root_tag, "tw-storydata");
        assert_eq!(config.output.extension, "story.json");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here/desugarcube.toml")
            .build()
            .unwrap();
        assert_eq!(config.output.extension, "json");
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new()
            .with_file("/definitely/not/here/desugarcube.toml")
            .build();
        assert!(result.is_err());
    }
}
