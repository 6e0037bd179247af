//! Expression tree produced by the filter parser.
//!
//! The tree only has three node kinds that can stand on their own:
//! [`CompoundExpression`], [`BinaryExpression`] and [`UnaryExpression`].
//! [`Field`] and [`Value`] only appear as the two operands of a binary
//! comparison, so a bare field or value can never be combined with `and`,
//! `or` or `not`.
//!
//! Trees are immutable once built. Renderers walk them through the
//! [`ExpressionVisitor`](crate::visitor::ExpressionVisitor) protocol.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::operator::Operator;

/// A single literal in a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Absolute point in time.
    Instant(DateTime<Utc>),
    /// String value.
    String(String),
}

impl Scalar {
    /// Check if this is a numeric value, rendered without quotes.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Get the string if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Instant(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Instant(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Right-hand operand of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// One literal.
    Single(Scalar),
    /// Ordered literals, e.g. for `in` and `between`.
    List(Vec<Scalar>),
}

impl Value {
    /// Check if this value holds a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The literals in order. A single value yields one item.
    pub fn scalars(&self) -> &[Scalar] {
        match self {
            Self::Single(s) => std::slice::from_ref(s),
            Self::List(values) => values,
        }
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.scalars().len()
    }

    /// Check if this is an empty list.
    pub fn is_empty(&self) -> bool {
        self.scalars().is_empty()
    }

    /// The value as infix text: list items joined with `,`.
    pub fn infix(&self) -> String {
        self.scalars()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

macro_rules! impl_single_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::Single(v.into())
                }
            }
        )*
    };
}

impl_single_value!(Scalar, i32, i64, f64, bool, DateTime<Utc>, String, &str);

impl<T: Into<Scalar>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Left-hand operand of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
}

impl Field {
    /// Create a field reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The field name as written in the filter.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// `field <op> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// Comparison operator.
    pub operator: Operator,
    /// Field being compared.
    pub field: Field,
    /// Value compared against.
    pub value: Value,
}

impl BinaryExpression {
    /// Create a comparison.
    pub fn new(operator: Operator, field: Field, value: impl Into<Value>) -> Self {
        Self {
            operator,
            field,
            value: value.into(),
        }
    }
}

/// `left <op> right` for a logical operator.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundExpression {
    /// Logical operator.
    pub operator: Operator,
    /// Left operand.
    pub left: Box<Expression>,
    /// Right operand.
    pub right: Box<Expression>,
}

/// `<op> operand`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// Unary operator.
    pub operator: Operator,
    /// Wrapped sub-expression.
    pub operand: Box<Expression>,
}

/// A node that can be combined with logical operators.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Logical combination of two expressions.
    Compound(CompoundExpression),
    /// Field comparison.
    Binary(BinaryExpression),
    /// Negation or other single-operand operator.
    Unary(UnaryExpression),
}

impl Expression {
    /// Create a compound expression.
    pub fn compound(left: Expression, operator: Operator, right: Expression) -> Self {
        Self::Compound(CompoundExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Create a binary comparison.
    pub fn binary(operator: Operator, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Binary(BinaryExpression::new(operator, Field::new(field), value))
    }

    /// Create a unary expression.
    pub fn unary(operator: Operator, operand: Expression) -> Self {
        Self::Unary(UnaryExpression {
            operator,
            operand: Box::new(operand),
        })
    }

    /// The operator at the root of this expression.
    pub fn operator(&self) -> &Operator {
        match self {
            Self::Compound(node) => &node.operator,
            Self::Binary(node) => &node.operator,
            Self::Unary(node) => &node.operator,
        }
    }

    /// Nesting depth, counting a lone comparison as 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Compound(node) => 1 + node.left.depth().max(node.right.depth()),
            Self::Binary(_) => 1,
            Self::Unary(node) => 1 + node.operand.depth(),
        }
    }
}

impl From<BinaryExpression> for Expression {
    fn from(node: BinaryExpression) -> Self {
        Self::Binary(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{OperatorRegistry, names};
    use chrono::TimeZone;

    fn op(name: &str) -> Operator {
        OperatorRegistry::with_defaults().get(name).cloned().unwrap()
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::from(42).to_string(), "42");
        assert_eq!(Scalar::from(2.5).to_string(), "2.5");
        assert_eq!(Scalar::from("it's").to_string(), "it's");

        let instant = Utc.with_ymd_and_hms(1996, 12, 20, 0, 39, 57).unwrap();
        assert_eq!(Scalar::from(instant).to_string(), "1996-12-20T00:39:57Z");

        let fractional = instant + chrono::Duration::microseconds(123_456);
        assert_eq!(Scalar::from(fractional).to_string(), "1996-12-20T00:39:57Z");
    }

    #[test]
    fn test_value_infix() {
        assert_eq!(Value::from("Saurabh").infix(), "Saurabh");
        assert_eq!(Value::from(vec![32, 35, 40]).infix(), "32,35,40");
        assert!(Value::List(Vec::new()).is_empty());
    }

    #[test]
    fn test_value_scalars() {
        let single = Value::from(7);
        assert!(!single.is_list());
        assert_eq!(single.scalars(), &[Scalar::Int(7)]);

        let list = Value::from(vec!["a", "b"]);
        assert!(list.is_list());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_expression_depth() {
        let a = Expression::binary(op(names::EQUALS), "a", "x");
        let b = Expression::binary(op(names::GT), "b", 1);
        assert_eq!(a.depth(), 1);

        let both = Expression::compound(a, op(names::AND), b);
        let negated = Expression::unary(op(names::NOT), both);
        assert_eq!(negated.depth(), 3);
        assert!(negated.operator().is(names::NOT));
    }
}
