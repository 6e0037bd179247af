//! Builds an [`Expression`] tree from a nested filter map.
//!
//! Each level of the map must have exactly one entry. Its key is either an
//! operator from the registry or a field name:
//!
//! - `and` / `or` take a list of sub-filters folded left to right,
//! - `not` takes one sub-filter,
//! - a field takes `{op: value}` or, without an explicit operator, a raw value
//!   or list that is compared with `in`.
//!
//! ```rust
//! use sieve_filter::{FilterArgument, FilterParser};
//!
//! let parser = FilterParser::new();
//! let filter = FilterArgument::map_from_json(
//!     r#"{"and": [{"name": {"starts": "Sa"}}, {"age": {"lt": 40}}]}"#,
//! ).unwrap();
//!
//! let tree = parser.parse(&filter).unwrap().unwrap();
//! assert_eq!(tree.to_string(), "((name starts Sa) and (age lt 40))");
//!
//! // Zero or several entries at one level means "no filter".
//! let empty = FilterArgument::map_from_json("{}").unwrap();
//! assert!(parser.parse(&empty).unwrap().is_none());
//! ```

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use tracing::{debug, trace};

use crate::argument::{FilterArgument, FilterMap};
use crate::ast::{BinaryExpression, Expression, Field, Scalar, Value};
use crate::config::SieveConfig;
use crate::error::{FilterError, FilterResult};
use crate::operator::{Operator, OperatorKind, OperatorRegistry, names};

/// Parser turning filter maps into expression trees.
#[derive(Debug, Clone)]
pub struct FilterParser {
    registry: Arc<OperatorRegistry>,
    local_offset: FixedOffset,
}

impl Default for FilterParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterParser {
    /// Create a parser over the default operators.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(OperatorRegistry::with_defaults()))
    }

    /// Create a parser over a shared registry.
    pub fn with_registry(registry: Arc<OperatorRegistry>) -> Self {
        Self {
            registry,
            local_offset: utc_offset(),
        }
    }

    /// Create a parser over the default operators using the `[parser]` section.
    pub fn from_config(config: &SieveConfig) -> FilterResult<Self> {
        Ok(Self::new().local_offset(config.parser.offset()?))
    }

    /// Set the offset used to anchor zone-less dates and date-times.
    pub fn local_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    /// The registry this parser consults.
    pub fn registry(&self) -> &Arc<OperatorRegistry> {
        &self.registry
    }

    /// Parse one filter map.
    ///
    /// Returns `Ok(None)` when the map does not describe a filter (zero or
    /// several entries at a level where exactly one is required).
    pub fn parse(&self, filter: &FilterMap) -> FilterResult<Option<Expression>> {
        let expression = self.parse_level(filter)?;
        debug!(
            depth = expression.as_ref().map(Expression::depth).unwrap_or(0),
            empty = expression.is_none(),
            "Parsed filter expression"
        );
        Ok(expression)
    }

    fn parse_level(&self, filter: &FilterMap) -> FilterResult<Option<Expression>> {
        if filter.len() != 1 {
            trace!(entries = filter.len(), "Filter level does not have exactly one entry");
            return Ok(None);
        }
        let Some((key, argument)) = filter.first() else {
            return Ok(None);
        };

        match self.registry.get(key) {
            Some(operator) => {
                trace!(operator = %operator, kind = %operator.kind(), "Parsing operator");
                match operator.kind() {
                    OperatorKind::Compound => self.parse_compound(operator, argument),
                    OperatorKind::Unary => self.parse_unary(operator, argument),
                    OperatorKind::Binary => Err(FilterError::MissingField {
                        operator: key.clone(),
                    }),
                }
            }
            None => self.parse_field(key, argument),
        }
    }

    fn parse_compound(
        &self,
        operator: &Operator,
        argument: &FilterArgument,
    ) -> FilterResult<Option<Expression>> {
        let items = argument
            .as_list()
            .ok_or_else(|| FilterError::invalid_argument(operator.name(), "a list of filters"))?;

        let mut children = Vec::with_capacity(items.len());
        for item in items {
            let child = item
                .as_map()
                .ok_or_else(|| FilterError::invalid_argument(operator.name(), "a list of filters"))?;
            children.push(self.parse_level(child)?);
        }

        Ok(fold_compound(operator, children))
    }

    fn parse_unary(
        &self,
        operator: &Operator,
        argument: &FilterArgument,
    ) -> FilterResult<Option<Expression>> {
        let inner = argument
            .as_map()
            .ok_or_else(|| FilterError::invalid_argument(operator.name(), "a filter"))?;

        Ok(self
            .parse_level(inner)?
            .map(|operand| Expression::unary(operator.clone(), operand)))
    }

    fn parse_field(&self, field: &str, argument: &FilterArgument) -> FilterResult<Option<Expression>> {
        let (operator, operand) = match argument {
            FilterArgument::Map(inner) => {
                if inner.len() != 1 {
                    trace!(field, entries = inner.len(), "Field comparison does not have exactly one entry");
                    return Ok(None);
                }
                let Some((key, operand)) = inner.first() else {
                    return Ok(None);
                };
                let operator = self.registry.get(key).ok_or_else(|| FilterError::UnknownOperator {
                    operator: key.clone(),
                    field: Some(field.to_string()),
                })?;
                if operator.kind() != OperatorKind::Binary {
                    return Err(FilterError::UnexpectedOperatorKind {
                        field: field.to_string(),
                        operator: key.clone(),
                        kind: operator.kind().as_str(),
                    });
                }
                (operator, operand)
            }
            // A bare value means membership.
            _ => {
                let operator = self.registry.get(names::IN).ok_or_else(|| FilterError::UnknownOperator {
                    operator: names::IN.to_string(),
                    field: Some(field.to_string()),
                })?;
                (operator, argument)
            }
        };

        let value = self.parse_value(operator, operand)?;
        Ok(Some(Expression::Binary(BinaryExpression::new(
            operator.clone(),
            Field::new(field),
            value,
        ))))
    }

    fn parse_value(&self, operator: &Operator, argument: &FilterArgument) -> FilterResult<Value> {
        match argument {
            FilterArgument::List(items) => items
                .iter()
                .map(|item| self.parse_scalar(operator, item))
                .collect::<FilterResult<Vec<_>>>()
                .map(Value::List),
            _ => self.parse_scalar(operator, argument).map(Value::Single),
        }
    }

    fn parse_scalar(&self, operator: &Operator, argument: &FilterArgument) -> FilterResult<Scalar> {
        let scalar = match argument {
            FilterArgument::Int(v) => Scalar::Int(*v),
            FilterArgument::Float(v) => Scalar::Float(*v),
            FilterArgument::Bool(v) => Scalar::Bool(*v),
            FilterArgument::String(v) => Scalar::String(v.clone()),
            FilterArgument::Instant(v) => Scalar::Instant(*v),
            FilterArgument::OffsetDateTime(v) => Scalar::Instant(v.with_timezone(&Utc)),
            FilterArgument::LocalDateTime(v) => Scalar::Instant(self.anchor(operator, *v)?),
            FilterArgument::Date(v) => {
                let midnight = v
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| FilterError::invalid_argument(operator.name(), "a valid date"))?;
                Scalar::Instant(self.anchor(operator, midnight)?)
            }
            FilterArgument::List(_) | FilterArgument::Map(_) => {
                return Err(FilterError::invalid_argument(
                    operator.name(),
                    "a scalar or a list of scalars",
                ));
            }
        };
        Ok(scalar)
    }

    fn anchor(&self, operator: &Operator, local: NaiveDateTime) -> FilterResult<DateTime<Utc>> {
        local
            .and_local_timezone(self.local_offset)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| FilterError::invalid_argument(operator.name(), "a representable date-time"))
    }
}

/// Fold parsed children left to right: `a, b, c` becomes `((a op b) op c)`.
///
/// Children that produced no expression are skipped.
fn fold_compound(operator: &Operator, children: Vec<Option<Expression>>) -> Option<Expression> {
    children.into_iter().fold(None, |acc, child| match (acc, child) {
        (Some(left), Some(right)) => Some(Expression::compound(left, operator.clone(), right)),
        (None, Some(right)) => Some(right),
        (acc, None) => acc,
    })
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
