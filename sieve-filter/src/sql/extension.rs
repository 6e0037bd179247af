//! Hooks for callers that need to change how fields and values are rendered.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::ast::{BinaryExpression, Value};
use crate::operator::Operator;

/// Renames fields and rewrites the values compared against them.
///
/// Both methods default to "no change".
pub trait FieldValueTransformer: Send + Sync {
    /// Return a replacement column name for `field`, or `None` to keep it.
    fn transform_field(&self, field: &str) -> Option<String> {
        let _ = field;
        None
    }

    /// Return a replacement `(field, value)` pair.
    ///
    /// Only consulted for fields that [`transform_field`](Self::transform_field)
    /// renamed. The returned value is used for SQL output only.
    fn transform_value(&self, field: &str, value: &Value) -> Option<(String, Value)> {
        let _ = (field, value);
        None
    }
}

/// Logical operator joining the fragments of a multi-valued custom expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicalOperator {
    /// Every fragment must hold.
    And,
    /// Any fragment may hold.
    #[default]
    Or,
}

impl LogicalOperator {
    /// SQL keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates the SQL for one comparison instead of the default `(field op value)`.
pub trait CustomFieldExpression: Send + Sync {
    /// Produce a fragment for one value.
    ///
    /// `field` is the rendered column name, `value` the rendered literal text
    /// (already escaped and quoted) and `symbol` the operator's SQL symbol.
    /// The renderer wraps the result in parentheses.
    fn generate_expression(
        &self,
        node: &BinaryExpression,
        field: &str,
        value: &str,
        symbol: &str,
    ) -> String;

    /// How fragments are joined when the comparison has several values.
    fn enclosing_logical_operator(&self) -> LogicalOperator {
        LogicalOperator::Or
    }
}

/// Decides which comparisons are rendered by a [`CustomFieldExpression`].
pub trait CustomExpressionResolver: Send + Sync {
    /// Check whether `(field, operator)` has a custom expression.
    fn contains(&self, field: &str, operator: &Operator) -> bool {
        self.resolve(field, operator).is_some()
    }

    /// Get the custom expression for `(field, operator)`.
    fn resolve(&self, field: &str, operator: &Operator) -> Option<&dyn CustomFieldExpression>;
}

struct FnExpression<F> {
    generate: F,
    enclosing: LogicalOperator,
}

impl<F> CustomFieldExpression for FnExpression<F>
where
    F: Fn(&BinaryExpression, &str, &str, &str) -> String + Send + Sync,
{
    fn generate_expression(
        &self,
        node: &BinaryExpression,
        field: &str,
        value: &str,
        symbol: &str,
    ) -> String {
        (self.generate)(node, field, value, symbol)
    }

    fn enclosing_logical_operator(&self) -> LogicalOperator {
        self.enclosing
    }
}

/// A resolver backed by a table keyed by field name and operator key.
///
/// ```rust
/// use sieve_filter::sql::{CustomExpressions, LogicalOperator};
///
/// let mut custom = CustomExpressions::new();
/// custom.register_fn("tags", "in", LogicalOperator::Or, |_, field, value, _| {
///     format!("{} @> ARRAY[{}]", field, value)
/// });
/// assert_eq!(custom.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct CustomExpressions {
    expressions: IndexMap<(String, SmolStr), Arc<dyn CustomFieldExpression>>,
}

impl fmt::Debug for CustomExpressions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.expressions.keys().map(|(field, op)| format!("{}.{}", field, op)))
            .finish()
    }
}

impl CustomExpressions {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an expression for `(field, operator)`, replacing any previous one.
    pub fn register(
        &mut self,
        field: impl Into<String>,
        operator: impl Into<SmolStr>,
        expression: impl CustomFieldExpression + 'static,
    ) -> &mut Self {
        self.expressions
            .insert((field.into(), operator.into()), Arc::new(expression));
        self
    }

    /// Register a closure as the expression for `(field, operator)`.
    pub fn register_fn<F>(
        &mut self,
        field: impl Into<String>,
        operator: impl Into<SmolStr>,
        enclosing: LogicalOperator,
        generate: F,
    ) -> &mut Self
    where
        F: Fn(&BinaryExpression, &str, &str, &str) -> String + Send + Sync + 'static,
    {
        self.register(field, operator, FnExpression { generate, enclosing })
    }

    /// Number of registered expressions.
    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl CustomExpressionResolver for CustomExpressions {
    fn contains(&self, field: &str, operator: &Operator) -> bool {
        self.expressions
            .contains_key(&(field.to_string(), SmolStr::new(operator.name())))
    }

    fn resolve(&self, field: &str, operator: &Operator) -> Option<&dyn CustomFieldExpression> {
        self.expressions
            .get(&(field.to_string(), SmolStr::new(operator.name())))
            .map(|expression| expression.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Field;
    use crate::operator::{OperatorRegistry, names};

    struct Upper;

    impl FieldValueTransformer for Upper {
        fn transform_field(&self, field: &str) -> Option<String> {
            Some(field.to_uppercase())
        }
    }

    #[test]
    fn test_transformer_defaults() {
        let upper = Upper;
        assert_eq!(upper.transform_field("name").as_deref(), Some("NAME"));
        assert!(upper.transform_value("name", &Value::from("x")).is_none());
    }

    #[test]
    fn test_custom_expressions_lookup() {
        let registry = OperatorRegistry::with_defaults();
        let in_op = registry.get(names::IN).unwrap();
        let eq_op = registry.get(names::EQ).unwrap();

        let mut custom = CustomExpressions::new();
        custom.register_fn("tags", names::IN, LogicalOperator::And, |_, field, value, symbol| {
            format!("{} {} {}", field, symbol, value)
        });

        assert!(custom.contains("tags", in_op));
        assert!(!custom.contains("tags", eq_op));
        assert!(!custom.contains("name", in_op));

        let expression = custom.resolve("tags", in_op).unwrap();
        let node = BinaryExpression::new(in_op.clone(), Field::new("tags"), "a");
        assert_eq!(expression.generate_expression(&node, "t", "'a'", "IN"), "t IN 'a'");
        assert_eq!(expression.enclosing_logical_operator(), LogicalOperator::And);
    }

    #[test]
    fn test_logical_operator_default() {
        assert_eq!(LogicalOperator::default(), LogicalOperator::Or);
        assert_eq!(LogicalOperator::And.to_string(), "AND");
    }
}
