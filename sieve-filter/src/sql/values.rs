//! Value rendering strategies, one per operator.

use std::fmt::Write as _;

use chrono::SecondsFormat;

use crate::ast::{Scalar, Value};
use crate::error::{FilterError, FilterResult};
use crate::normalize::SqlValueNormalizer;
use crate::operator::Operator;

const WILDCARD: char = '%';

/// What a [`ValueHandler`] knows about the comparison it renders.
#[derive(Debug, Clone, Copy)]
pub struct ValueContext<'a> {
    /// Operator of the comparison.
    pub operator: &'a Operator,
    /// Field name as written in the filter.
    pub field: &'a str,
    normalizer: &'a SqlValueNormalizer,
}

impl<'a> ValueContext<'a> {
    pub(crate) fn new(operator: &'a Operator, field: &'a str, normalizer: &'a SqlValueNormalizer) -> Self {
        Self {
            operator,
            field,
            normalizer,
        }
    }

    /// The normalizer in use by the renderer.
    pub fn normalizer(&self) -> &SqlValueNormalizer {
        self.normalizer
    }

    /// Render one scalar: numbers bare, everything else single-quoted.
    pub fn literal(&self, scalar: &Scalar) -> String {
        match scalar {
            Scalar::Int(v) => v.to_string(),
            Scalar::Float(v) => v.to_string(),
            Scalar::Bool(v) => format!("'{}'", v),
            Scalar::Instant(v) => format!("'{}'", v.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Scalar::String(v) => self.normalizer.literal(v),
        }
    }

    /// Render all scalars joined by `separator`.
    pub fn literals(&self, value: &Value, separator: &str) -> String {
        value
            .scalars()
            .iter()
            .map(|scalar| self.literal(scalar))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Renders the value side of a comparison for one operator.
pub trait ValueHandler: Send + Sync {
    /// Append the rendered value to `out`.
    fn handle(&self, ctx: &ValueContext<'_>, value: &Value, out: &mut String) -> FilterResult<()>;
}

/// Rendering used for operators without a handler.
pub fn render_default(ctx: &ValueContext<'_>, value: &Value, out: &mut String) {
    out.push_str(&ctx.literals(value, ", "));
}

/// `'%value%'`, or the value quoted as-is if it already has a `%`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainsHandler;

impl ValueHandler for ContainsHandler {
    fn handle(&self, ctx: &ValueContext<'_>, value: &Value, out: &mut String) -> FilterResult<()> {
        let text = value.infix();
        if text.contains(WILDCARD) {
            out.push_str(&ctx.normalizer().literal(&text));
        } else {
            out.push_str(&ctx.normalizer().pattern("%", &text, "%"));
        }
        Ok(())
    }
}

/// `'value%'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartsHandler;

impl ValueHandler for StartsHandler {
    fn handle(&self, ctx: &ValueContext<'_>, value: &Value, out: &mut String) -> FilterResult<()> {
        out.push_str(&ctx.normalizer().pattern("", &value.infix(), "%"));
        Ok(())
    }
}

/// `'%value'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndsHandler;

impl ValueHandler for EndsHandler {
    fn handle(&self, ctx: &ValueContext<'_>, value: &Value, out: &mut String) -> FilterResult<()> {
        out.push_str(&ctx.normalizer().pattern("%", &value.infix(), ""));
        Ok(())
    }
}

/// `low AND high`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetweenHandler;

impl ValueHandler for BetweenHandler {
    fn handle(&self, ctx: &ValueContext<'_>, value: &Value, out: &mut String) -> FilterResult<()> {
        match value.scalars() {
            [low, high] => {
                let _ = write!(out, "{} AND {}", ctx.literal(low), ctx.literal(high));
                Ok(())
            }
            other => Err(FilterError::BetweenArity {
                field: ctx.field.to_string(),
                count: other.len(),
            }),
        }
    }
}

/// `(v1, v2, ...)` in the original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct InHandler;

impl ValueHandler for InHandler {
    fn handle(&self, ctx: &ValueContext<'_>, value: &Value, out: &mut String) -> FilterResult<()> {
        let _ = write!(out, "({})", ctx.literals(value, ", "));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{OperatorRegistry, names};
    use chrono::{TimeZone, Utc};

    fn render(handler: &dyn ValueHandler, operator: &str, value: Value) -> FilterResult<String> {
        let registry = OperatorRegistry::with_defaults();
        let normalizer = SqlValueNormalizer::new();
        let ctx = ValueContext::new(registry.get(operator).unwrap(), "field", &normalizer);
        let mut out = String::new();
        handler.handle(&ctx, &value, &mut out)?;
        Ok(out)
    }

    #[test]
    fn test_contains_wraps_wildcards() {
        assert_eq!(render(&ContainsHandler, names::CONTAINS, "ura".into()).unwrap(), "'%ura%'");
        assert_eq!(
            render(&ContainsHandler, names::CONTAINS, "Jack o'%antern'".into()).unwrap(),
            "'Jack o''%antern'''"
        );
    }

    #[test]
    fn test_starts_and_ends() {
        assert_eq!(render(&StartsHandler, names::STARTS, "Sa".into()).unwrap(), "'Sa%'");
        assert_eq!(render(&EndsHandler, names::ENDS, "bh".into()).unwrap(), "'%bh'");
    }

    #[test]
    fn test_between() {
        assert_eq!(
            render(&BetweenHandler, names::BETWEEN, vec![32, 40].into()).unwrap(),
            "32 AND 40"
        );

        let low = Utc.with_ymd_and_hms(1996, 12, 20, 0, 39, 57).unwrap();
        let high = Utc.with_ymd_and_hms(2024, 12, 20, 0, 39, 57).unwrap();
        assert_eq!(
            render(&BetweenHandler, names::BETWEEN, vec![low, high].into()).unwrap(),
            "'1996-12-20T00:39:57Z' AND '2024-12-20T00:39:57Z'"
        );
    }

    #[test]
    fn test_between_arity() {
        let err = render(&BetweenHandler, names::BETWEEN, vec![1, 2, 3].into()).unwrap_err();
        assert!(matches!(err, FilterError::BetweenArity { count: 3, .. }));

        let err = render(&BetweenHandler, names::BETWEEN, 1.into()).unwrap_err();
        assert!(matches!(err, FilterError::BetweenArity { count: 1, .. }));
    }

    #[test]
    fn test_in_preserves_order() {
        assert_eq!(
            render(&InHandler, names::IN, vec!["Jaiswal", "Gupta", "Kumar"].into()).unwrap(),
            "('Jaiswal', 'Gupta', 'Kumar')"
        );
        assert_eq!(render(&InHandler, names::IN, 40.into()).unwrap(), "(40)");
    }

    #[test]
    fn test_literal_kinds() {
        let registry = OperatorRegistry::with_defaults();
        let normalizer = SqlValueNormalizer::new();
        let ctx = ValueContext::new(registry.get(names::EQ).unwrap(), "f", &normalizer);

        assert_eq!(ctx.literal(&Scalar::Int(5)), "5");
        assert_eq!(ctx.literal(&Scalar::Float(2.5)), "2.5");
        assert_eq!(ctx.literal(&Scalar::Bool(true)), "'true'");
        assert_eq!(ctx.literal(&Scalar::from("it's")), "'it''s'");

        let instant = Utc.with_ymd_and_hms(1996, 12, 20, 0, 39, 57).unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(ctx.literal(&Scalar::from(instant)), "'1996-12-20T00:39:57Z'");

        let mut out = String::new();
        render_default(&ctx, &Value::from(vec![1, 2]), &mut out);
        assert_eq!(out, "1, 2");
    }
}
