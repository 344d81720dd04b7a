//! Miette diagnostics for configuration errors.
//!
//! Points at the offending part of the TOML file when it can be located:
//! the parser's own span for syntax errors, the first occurrence of the key
//! for validation errors.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError, Error};

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(hatchery::config))]
pub struct ConfigDiagnostic {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    /// Build a diagnostic for `error`, raised while loading `content` from
    /// the file called `name`.
    #[must_use]
    pub fn from_error(name: &str, content: &str, error: &Error) -> Self {
        let (message, span, help) = match error {
            Error::Config(ConfigError::Parse(e)) => (
                format!("invalid TOML: {}", e.message()),
                e.span().map(|range| SourceSpan::from(range.start..range.end)),
                None,
            ),
            Error::Config(ConfigError::InvalidValue { field, reason }) => (
                format!("invalid value for `{field}`: {reason}"),
                key_span(content, field),
                Some(format!("fix `{field}` and run `hatchery check config` again")),
            ),
            Error::Config(ConfigError::MissingField { field }) => (
                format!("missing value for `{field}`"),
                key_span(content, field),
                Some(format!("set `{field}` to a non-empty value")),
            ),
            other => (other.to_string(), None, None),
        };

        Self {
            message,
            src: NamedSource::new(name, content.to_string()),
            span,
            help,
        }
    }
}

/// Span of the first line assigning `key`.
fn key_span(content: &str, key: &str) -> Option<SourceSpan> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let assigns = trimmed
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if assigns {
            let start = offset + (line.len() - trimmed.len());
            return Some(SourceSpan::from(start..start + key.len()));
        }
        offset += line.len();
    }
    None
}
