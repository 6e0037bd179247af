//! Raw filter arguments as handed over by the query layer.
//!
//! A [`FilterMap`] is one level of a filter: an insertion-ordered map from key
//! (operator or field name) to [`FilterArgument`]. Maps usually come from a
//! deserialized JSON/GraphQL input object:
//!
//! ```rust
//! use sieve_filter::{FilterArgument, FilterMap};
//!
//! let filter: FilterMap = FilterArgument::map_from_json(
//!     r#"{"or": [{"firstName": {"contains": "Saurabh"}}, {"age": {"gt": 30}}]}"#,
//! ).unwrap();
//! assert_eq!(filter.len(), 1);
//! assert!(matches!(filter.get("or"), Some(FilterArgument::List(items)) if items.len() == 2));
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;

use crate::error::{FilterError, FilterResult};

/// One level of a filter argument.
pub type FilterMap = IndexMap<String, FilterArgument>;

/// A value inside a filter argument map.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArgument {
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(String),
    /// Calendar date without a zone.
    Date(NaiveDate),
    /// Date and time without a zone.
    LocalDateTime(NaiveDateTime),
    /// Date and time with a UTC offset.
    OffsetDateTime(DateTime<FixedOffset>),
    /// Absolute point in time.
    Instant(DateTime<Utc>),
    /// Ordered list of arguments.
    List(Vec<FilterArgument>),
    /// Nested filter level.
    Map(FilterMap),
}

impl FilterArgument {
    /// Parse a JSON document into a filter map. Key order is preserved.
    pub fn map_from_json(json: &str) -> FilterResult<FilterMap> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|source| FilterError::Json { source })?;
        match Self::try_from(value)? {
            Self::Map(map) => Ok(map),
            _ => Err(FilterError::UnsupportedValue {
                message: "filter document must be a JSON object".to_string(),
            }),
        }
    }

    /// Short name of the argument shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::LocalDateTime(_) => "local date-time",
            Self::OffsetDateTime(_) => "offset date-time",
            Self::Instant(_) => "instant",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Get the nested map if this is a map.
    pub fn as_map(&self) -> Option<&FilterMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get the items if this is a list.
    pub fn as_list(&self) -> Option<&[FilterArgument]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

fn out_of_range(n: &serde_json::Number) -> FilterError {
    FilterError::UnsupportedValue {
        message: format!("number {} is out of range", n),
    }
}

impl TryFrom<serde_json::Value> for FilterArgument {
    type Error = FilterError;

    fn try_from(value: serde_json::Value) -> FilterResult<Self> {
        use serde_json::Value as Json;

        match value {
            Json::Null => Err(FilterError::UnsupportedValue {
                message: "null is not a filter value".to_string(),
            }),
            Json::Bool(b) => Ok(Self::Bool(b)),
            Json::Number(n) => match (n.as_i64(), n.is_f64()) {
                (Some(i), _) => Ok(Self::Int(i)),
                (None, true) => n.as_f64().map(Self::Float).ok_or_else(|| out_of_range(&n)),
                // Unsigned integers above i64::MAX would lose precision as floats.
                (None, false) => Err(out_of_range(&n)),
            },
            Json::String(s) => Ok(Self::String(s)),
            Json::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<FilterResult<Vec<_>>>()
                .map(Self::List),
            Json::Object(entries) => entries
                .into_iter()
                .map(|(key, value)| Self::try_from(value).map(|value| (key, value)))
                .collect::<FilterResult<FilterMap>>()
                .map(Self::Map),
        }
    }
}

impl From<i32> for FilterArgument {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterArgument {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterArgument {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FilterArgument {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for FilterArgument {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterArgument {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDate> for FilterArgument {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for FilterArgument {
    fn from(v: NaiveDateTime) -> Self {
        Self::LocalDateTime(v)
    }
}

impl From<DateTime<FixedOffset>> for FilterArgument {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::OffsetDateTime(v)
    }
}

impl From<DateTime<Utc>> for FilterArgument {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Instant(v)
    }
}

impl From<FilterMap> for FilterArgument {
    fn from(v: FilterMap) -> Self {
        Self::Map(v)
    }
}

impl<T: Into<FilterArgument>> From<Vec<T>> for FilterArgument {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Build a [`FilterMap`] from `key => value` pairs.
///
/// ```rust
/// use sieve_filter::filter_map;
///
/// let filter = filter_map! {
///     "lastName" => filter_map! { "in" => vec!["Jaiswal", "Gupta"] },
/// };
/// assert_eq!(filter.len(), 1);
/// ```
#[macro_export]
macro_rules! filter_map {
    () => {
        $crate::FilterMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::FilterMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::FilterArgument::from($value));
        )+
        map
    }};
}
