//! Configuration file parsing for `sieve.toml`.
//!
//! ```toml
//! [parser]
//! local_offset = "+05:30"
//!
//! [render]
//! where_prefix = true
//! metadata_prefix = "filter."
//!
//! [render.field_map]
//! firstName = "${FIRST_NAME_COLUMN}"
//!
//! [render.operator_symbols]
//! ilike = "ILIKE"
//! ```
//!
//! `${VAR}` references are replaced from the environment before parsing.

use std::path::Path;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::sql::DEFAULT_METADATA_PREFIX;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "SIEVE_CONFIG";

/// Main configuration structure for `sieve.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SieveConfig {
    /// Parser settings.
    #[serde(default)]
    pub parser: ParserConfig,

    /// SQL renderer settings.
    #[serde(default)]
    pub render: RenderConfig,
}

impl SieveConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> FilterResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| FilterError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> FilterResult<Self> {
        let expanded = expand_env_vars(content);

        let config: Self = toml::from_str(&expanded).map_err(|e| FilterError::Toml { source: e })?;
        config.parser.offset()?;
        Ok(config)
    }

    /// Load the file named by `SIEVE_CONFIG`, or the defaults if it is unset.
    pub fn from_env() -> FilterResult<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// UTC offset used for dates and date-times without a zone, e.g. `+05:30`.
    #[serde(default = "default_local_offset")]
    pub local_offset: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            local_offset: default_local_offset(),
        }
    }
}

impl ParserConfig {
    /// The configured offset.
    pub fn offset(&self) -> FilterResult<FixedOffset> {
        let raw = self.local_offset.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return Ok(Utc.fix());
        }
        FixedOffset::from_str(raw).map_err(|e| FilterError::InvalidConfig {
            key: "parser.local_offset".to_string(),
            message: format!("`{}` is not a UTC offset: {}", raw, e),
        })
    }
}

/// SQL renderer settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Prefix the output with `WHERE `.
    #[serde(default = "default_true")]
    pub where_prefix: bool,

    /// Prefix of metadata keys.
    #[serde(default = "default_metadata_prefix")]
    pub metadata_prefix: String,

    /// Pass JSON payloads through to custom expressions.
    #[serde(default = "default_true")]
    pub structured_payloads: bool,

    /// Filter field name to column name.
    #[serde(default)]
    pub field_map: IndexMap<String, String>,

    /// Additional or replacement operator symbols.
    #[serde(default)]
    pub operator_symbols: IndexMap<String, String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            where_prefix: true,
            metadata_prefix: default_metadata_prefix(),
            structured_payloads: true,
            field_map: IndexMap::new(),
            operator_symbols: IndexMap::new(),
        }
    }
}

fn default_local_offset() -> String {
    "+00:00".to_string()
}

fn default_metadata_prefix() -> String {
    DEFAULT_METADATA_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

/// Expand `${VAR}` references with values from the environment.
///
/// Unknown variables are left as written.
fn expand_env_vars(content: &str) -> String {
    let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex_lite::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SieveConfig::default();
        assert_eq!(config.parser.local_offset, "+00:00");
        assert!(config.render.where_prefix);
        assert_eq!(config.render.metadata_prefix, "filter.");
        assert!(config.render.structured_payloads);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [parser]
            local_offset = "+05:30"

            [render]
            where_prefix = false
            metadata_prefix = "audit."

            [render.field_map]
            firstName = "empFirstName"

            [render.operator_symbols]
            ilike = "ILIKE"
        "#;

        let config = SieveConfig::from_str(toml).unwrap();
        assert_eq!(
            config.parser.offset().unwrap(),
            FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
        );
        assert!(!config.render.where_prefix);
        assert!(config.render.structured_payloads);
        assert_eq!(config.render.metadata_prefix, "audit.");
        assert_eq!(config.render.field_map["firstName"], "empFirstName");
        assert_eq!(config.render.operator_symbols["ilike"], "ILIKE");
    }

    #[test]
    fn test_utc_aliases() {
        let config = ParserConfig {
            local_offset: "UTC".to_string(),
        };
        assert_eq!(config.offset().unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_invalid_offset() {
        let err = SieveConfig::from_str("[parser]\nlocal_offset = \"soon\"").unwrap_err();
        assert!(matches!(err, FilterError::InvalidConfig { ref key, .. } if key == "parser.local_offset"));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = SieveConfig::from_str("[render]\nwhere = true").unwrap_err();
        assert!(matches!(err, FilterError::Toml { .. }));
    }

    #[test]
    fn test_unset_env_vars_are_kept() {
        assert_eq!(expand_env_vars("x = \"${SIEVE_TEST_UNSET_VAR}\""), "x = \"${SIEVE_TEST_UNSET_VAR}\"");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nstructured_payloads = false").unwrap();

        let config = SieveConfig::from_file(file.path()).unwrap();
        assert!(!config.render.structured_payloads);

        let err = SieveConfig::from_file("/nonexistent/sieve.toml").unwrap_err();
        assert!(matches!(err, FilterError::Io { .. }));
    }
}
