//! Error types for filter parsing, rendering and configuration.
//!
//! Every failure surfaces as a [`FilterError`]. Variants carry enough context
//! (operator key, field name) to point at the offending part of the filter
//! argument, and each one has a stable diagnostic code:
//!
//! ```rust
//! use sieve_filter::FilterError;
//!
//! let err = FilterError::UnknownOperator {
//!     operator: "like".into(),
//!     field: Some("name".into()),
//! };
//! assert!(err.is_parse_error());
//! assert!(err.to_string().contains("like"));
//! ```
//!
//! A malformed filter map (zero or several entries at one level) is *not* an
//! error: the parser returns `Ok(None)` and callers treat it as "no filter".

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while building or rendering a filter expression.
#[derive(Error, Debug, Diagnostic)]
pub enum FilterError {
    /// A key in operator position is not in the registry.
    #[error("unknown operator `{operator}`{}", field_suffix(.field))]
    #[diagnostic(
        code(sieve::filter::unknown_operator),
        help("register the operator with `OperatorRegistry::register` or fix the filter key")
    )]
    UnknownOperator {
        operator: String,
        field: Option<String>,
    },

    /// A comparison operator was used without a field to compare.
    #[error("operator `{operator}` compares a field but no field was given")]
    #[diagnostic(
        code(sieve::filter::missing_field),
        help("nest the comparison under a field name")
    )]
    MissingField { operator: String },

    /// A field was given a logical operator instead of a comparison.
    #[error("field `{field}` expects a comparison operator but `{operator}` is {kind}")]
    #[diagnostic(code(sieve::filter::unexpected_operator_kind))]
    UnexpectedOperatorKind {
        field: String,
        operator: String,
        kind: &'static str,
    },

    /// The argument under a key has the wrong shape.
    #[error("invalid argument for `{key}`: expected {expected}")]
    #[diagnostic(code(sieve::filter::invalid_argument))]
    InvalidArgument { key: String, expected: &'static str },

    /// A raw input value cannot be represented in a filter.
    #[error("unsupported filter value: {message}")]
    #[diagnostic(code(sieve::filter::unsupported_value))]
    UnsupportedValue { message: String },

    /// The renderer has no symbol for an operator.
    #[error("operator `{operator}` is not supported by the {renderer} renderer")]
    #[diagnostic(
        code(sieve::render::unsupported_operator),
        help("add a symbol with `SqlRenderer::operator_symbol`")
    )]
    UnsupportedOperator {
        operator: String,
        renderer: &'static str,
    },

    /// `between` needs exactly a lower and an upper bound.
    #[error("`between` on `{field}` needs exactly 2 values, got {count}")]
    #[diagnostic(code(sieve::render::between_arity))]
    BetweenArity { field: String, count: usize },

    /// A structured payload handed to a custom expression is not valid JSON.
    #[error("malformed structured payload for `{field}`")]
    #[diagnostic(code(sieve::render::malformed_payload))]
    MalformedPayload {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// The filter document is not valid JSON.
    #[error("failed to parse filter document")]
    #[diagnostic(code(sieve::filter::json))]
    Json {
        #[source]
        source: serde_json::Error,
    },

    /// Error reading a configuration file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(sieve::config::io_error))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a TOML configuration.
    #[error("failed to parse config")]
    #[diagnostic(code(sieve::config::toml_error))]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid config value for `{key}`: {message}")]
    #[diagnostic(code(sieve::config::invalid))]
    InvalidConfig { key: String, message: String },
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(field) => format!(" on field `{}`", field),
        None => String::new(),
    }
}

impl FilterError {
    /// Create an invalid argument error.
    pub fn invalid_argument(key: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidArgument {
            key: key.into(),
            expected,
        }
    }

    /// Create an unsupported operator error for the given renderer.
    pub fn unsupported_operator(operator: impl Into<String>, renderer: &'static str) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            renderer,
        }
    }

    /// Check if this error was raised while building the expression tree.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownOperator { .. }
                | Self::MissingField { .. }
                | Self::UnexpectedOperatorKind { .. }
                | Self::InvalidArgument { .. }
                | Self::UnsupportedValue { .. }
                | Self::Json { .. }
        )
    }

    /// Check if this error was raised while rendering a tree.
    pub fn is_render_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperator { .. }
                | Self::BetweenArity { .. }
                | Self::MalformedPayload { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_operator_message() {
        let err = FilterError::UnknownOperator {
            operator: "like".into(),
            field: Some("name".into()),
        };
        assert_eq!(err.to_string(), "unknown operator `like` on field `name`");

        let err = FilterError::UnknownOperator {
            operator: "like".into(),
            field: None,
        };
        assert_eq!(err.to_string(), "unknown operator `like`");
    }

    #[test]
    fn test_error_categories() {
        assert!(FilterError::invalid_argument("and", "a list").is_parse_error());
        assert!(!FilterError::invalid_argument("and", "a list").is_render_error());

        let err = FilterError::unsupported_operator("regex", "sql");
        assert!(err.is_render_error());
        assert!(err.to_string().contains("sql renderer"));

        let err = FilterError::BetweenArity {
            field: "age".into(),
            count: 3,
        };
        assert!(err.is_render_error());
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn test_diagnostic_codes() {
        let err = FilterError::MissingField {
            operator: "equals".into(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("sieve::filter::missing_field"));
    }
}
