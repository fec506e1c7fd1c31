//! Configuration errors and validation diagnostics.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Dotted path of a config key, e.g. `serve.port`.
///
/// Sections declare theirs as associated constants:
///
/// ```ignore
/// impl ServeConfig {
///     pub const PORT: FieldPath = FieldPath::new("serve.port");
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// `[build]` for `build.extensions`.
    pub fn section(self) -> &'static str {
        self.0.split_once('.').map_or(self.0, |(section, _)| section)
    }

    /// `extensions` for `build.extensions`.
    pub fn key(self) -> &'static str {
        self.0.split_once('.').map_or(self.0, |(_, key)| key)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    // no #[from]: a source() here would print every diagnostic twice
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

/// One rejected config value.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {} {}: {}", "→".red(), self.field.key().cyan(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n    {} {}", "hint:".yellow(), hint)?;
        }
        Ok(())
    }
}

/// Validation errors collected across all sections, reported together.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    errors: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(field, message.into(), Some(hint.into()));
    }

    fn push(&mut self, field: FieldPath, message: String, hint: Option<String>) {
        self.errors.push(ConfigDiagnostic {
            field,
            message,
            hint,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ConfigDiagnostic] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Grouped by section, in the order the errors were found:
///
/// ```text
/// invalid hotpatch.toml:
/// [build]
///   → extensions: must not be empty
/// ```
impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", "invalid hotpatch.toml:".red().bold())?;
        let mut section = None;
        for err in &self.errors {
            if section != Some(err.field.section()) {
                section = Some(err.field.section());
                write!(f, "\n{}", format_args!("[{}]", err.field.section()).dimmed())?;
            }
            write!(f, "\n{err}")?;
        }
        if self.errors.len() > 1 {
            write!(
                f,
                "\n{} {}",
                self.errors.len().to_string().red().bold(),
                "errors".dimmed()
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("hotpatch.toml"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("hotpatch.toml"));
    }

    #[test]
    fn test_field_path_parts() {
        let field = FieldPath::new("build.state_constructors");
        assert_eq!(field.section(), "build");
        assert_eq!(field.key(), "state_constructors");
        assert_eq!(FieldPath::new("root").section(), "root");
    }

    #[test]
    fn test_diagnostics_grouped_by_section() {
        owo_colors::set_override(false);
        let mut diag = ConfigDiagnostics::new();
        assert!(ConfigDiagnostics::new().into_result().is_ok());

        diag.error_with_hint(FieldPath::new("build.mode"), "bad mode", "use development");
        diag.error(FieldPath::new("build.extensions"), "empty");
        diag.error(FieldPath::new("serve.port"), "bad port");
        assert!(diag.has_errors());

        let diag = diag.into_result().unwrap_err();
        assert_eq!(diag.errors()[0].hint.as_deref(), Some("use development"));
        let display = diag.to_string();
        assert_eq!(display.matches("[build]").count(), 1);
        assert!(display.contains("[serve]"));
        assert!(display.contains("port: bad port"));
        assert!(display.contains("3 errors"));
    }
}
