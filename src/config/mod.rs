//! Project configuration management for `hotpatch.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, FieldPath, ConfigDiagnostics
//! │   └── handle     # Global config handle
//! └── mod.rs         # HotpatchConfig (this file)
//! ```
//!
//! # Precedence
//!
//! Defaults, then `hotpatch.toml`, then `HOTPATCH_MODE`, then CLI flags.
//! A missing config file is fine unless `--config` named one explicitly.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildConfig, ServeConfig, is_identifier};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config, reload_config};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG};
use crate::core::BuildMode;
use crate::instrument::InstrumentOptions;
use crate::log;
use crate::utils::path::{module_id, normalize_path};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing hotpatch.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HotpatchConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Instrumentation settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl HotpatchConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is
    /// the config file's parent directory, or cwd when there is none.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                bail!(ConfigError::Io(
                    cli.config.clone(),
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }
            None => (Self::default(), cwd.join(DEFAULT_CONFIG)),
        };

        config.config_path = config_path;
        config.cli = Some(cli);
        config.finalize(cli, BuildMode::from_env());
        config.validate()?;

        Ok(config)
    }

    /// Finalize configuration after loading.
    fn finalize(&mut self, cli: &Cli, env_mode: Option<BuildMode>) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.root = normalize_path(&root);
        self.config_path = normalize_path(&self.config_path);

        self.apply_mode(env_mode, cli.mode);
        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        let root = self.root.clone();
        self.serve.watch = self
            .serve
            .watch
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();
    }

    /// Environment overrides the file, the CLI flag overrides both.
    fn apply_mode(&mut self, env_mode: Option<BuildMode>, cli_mode: Option<BuildMode>) {
        Self::update_option(&mut self.build.mode, env_mode.as_ref());
        Self::update_option(&mut self.build.mode, cli_mode.as_ref());
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Module identifier of `path`: root-relative with `/` separators.
    ///
    /// The same id names the module in registry keys and reload messages.
    pub fn module_id(&self, path: &Path) -> String {
        module_id(&self.root, path)
    }

    /// Instrumentor options derived from `[build]`.
    pub fn instrument_options(&self) -> InstrumentOptions {
        InstrumentOptions::from(&self.build)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        if self.cli.is_some_and(Cli::is_serve) {
            self.serve.validate(&mut diag);
        }

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> HotpatchConfig {
    let (parsed, ignored) = HotpatchConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("hotpatch").chain(args.iter().copied()))
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = HotpatchConfig::from_str("[build\nmode = \"production\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_config_default() {
        let config = HotpatchConfig::default();
        assert!(config.cli.is_none());
        assert_eq!(config.config_path, PathBuf::new());
        assert!(config.build.mode.is_dev());
        assert_eq!(config.serve.port, 5278);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\nmode = \"development\"\nminify = true\n[unknown_section]\nfield = 1";
        let (config, ignored) = HotpatchConfig::parse_with_ignored(content).unwrap();
        assert!(config.build.mode.is_dev());
        assert!(ignored.iter().any(|f| f == "build.minify"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG);
        fs::write(&path, "[serve]\nport = 6000\n").unwrap();

        let config = HotpatchConfig::from_path(&path).unwrap();
        assert_eq!(config.serve.port, 6000);

        let missing = HotpatchConfig::from_path(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));
    }

    #[test]
    fn test_mode_precedence() {
        let mut config = test_parse_config("[build]\nmode = \"production\"");

        config.apply_mode(None, None);
        assert_eq!(config.build.mode, BuildMode::Production);

        config.apply_mode(Some(BuildMode::Development), None);
        assert_eq!(config.build.mode, BuildMode::Development);

        // CLI wins over the environment
        config.apply_mode(Some(BuildMode::Development), Some(BuildMode::Production));
        assert_eq!(config.build.mode, BuildMode::Production);
    }

    #[test]
    fn test_finalize_applies_serve_flags_and_roots() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        let mut config = test_parse_config("[serve]\nport = 6000");
        config.config_path = dir.path().join(DEFAULT_CONFIG);
        config.finalize(&cli(&["serve", "--port", "7000"]), None);

        assert_eq!(config.serve.port, 7000);
        assert_eq!(config.get_root(), normalize_path(dir.path()));
        assert_eq!(config.serve.watch, [normalize_path(&dir.path().join("src"))]);
    }

    #[test]
    fn test_module_id_is_root_relative() {
        let dir = TempDir::new().unwrap();
        let mut config = HotpatchConfig::default();
        config.config_path = dir.path().join(DEFAULT_CONFIG);
        config.finalize(&cli(&["transform", "x.jsx"]), None);

        let file = config.get_root().join("src").join("Counter.jsx");
        assert_eq!(config.module_id(&file), "src/Counter.jsx");
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = test_parse_config("[build]\nextensions = []\nbuild_method = \"1\"");
        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_instrument_options_follow_build_section() {
        let config = test_parse_config("[build]\nbuild_method = \"view\"\naccept_footer = false");
        let options = config.instrument_options();
        assert_eq!(options.build_method, "view");
        assert!(!options.accept_footer);
    }
}
