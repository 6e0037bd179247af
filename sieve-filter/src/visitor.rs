//! Traversal protocol shared by all renderers.
//!
//! A renderer implements [`ExpressionVisitor`] once, with one method per node
//! kind. Each node's `accept` method dispatches to the matching `visit_*`
//! method, passing itself and the current accumulator; the visitor returns the
//! new accumulator. The tree never needs to know which renderer is walking it.
//!
//! ```rust
//! use sieve_filter::{FilterArgument, FilterParser};
//! use sieve_filter::visitor::{ExpressionVisitor, InfixVisitor};
//!
//! let filter = FilterArgument::map_from_json(r#"{"age": {"gte": 21}}"#).unwrap();
//! let tree = FilterParser::new().parse(&filter).unwrap().unwrap();
//!
//! let infix = InfixVisitor.render(&tree).unwrap();
//! assert_eq!(infix, "(age gte 21)");
//! ```

use std::fmt;

use crate::ast::{BinaryExpression, CompoundExpression, Expression, Field, UnaryExpression, Value};
use crate::error::FilterResult;

/// A tree walker producing an `Output` by folding over the nodes.
pub trait ExpressionVisitor {
    /// Accumulated result type.
    type Output;

    /// Initial accumulator handed to the root node.
    fn seed(&self) -> Self::Output;

    /// Visit a logical combination.
    fn visit_compound(
        &mut self,
        node: &CompoundExpression,
        acc: Self::Output,
    ) -> FilterResult<Self::Output>;

    /// Visit a field comparison.
    fn visit_binary(
        &mut self,
        node: &BinaryExpression,
        acc: Self::Output,
    ) -> FilterResult<Self::Output>;

    /// Visit a single-operand expression.
    fn visit_unary(
        &mut self,
        node: &UnaryExpression,
        acc: Self::Output,
    ) -> FilterResult<Self::Output>;

    /// Visit the field side of a comparison.
    fn visit_field(&mut self, node: &Field, acc: Self::Output) -> FilterResult<Self::Output>;

    /// Visit the value side of a comparison.
    fn visit_value(&mut self, node: &Value, acc: Self::Output) -> FilterResult<Self::Output>;

    /// Walk a whole tree starting from the seed accumulator.
    fn render(&mut self, tree: &Expression) -> FilterResult<Self::Output>
    where
        Self: Sized,
    {
        let seed = self.seed();
        tree.accept(self, seed)
    }
}

impl Expression {
    /// Dispatch to the visitor method for this node kind.
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V, acc: V::Output) -> FilterResult<V::Output> {
        match self {
            Self::Compound(node) => node.accept(visitor, acc),
            Self::Binary(node) => node.accept(visitor, acc),
            Self::Unary(node) => node.accept(visitor, acc),
        }
    }
}

impl CompoundExpression {
    /// Dispatch to [`ExpressionVisitor::visit_compound`].
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V, acc: V::Output) -> FilterResult<V::Output> {
        visitor.visit_compound(self, acc)
    }
}

impl BinaryExpression {
    /// Dispatch to [`ExpressionVisitor::visit_binary`].
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V, acc: V::Output) -> FilterResult<V::Output> {
        visitor.visit_binary(self, acc)
    }
}

impl UnaryExpression {
    /// Dispatch to [`ExpressionVisitor::visit_unary`].
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V, acc: V::Output) -> FilterResult<V::Output> {
        visitor.visit_unary(self, acc)
    }
}

impl Field {
    /// Dispatch to [`ExpressionVisitor::visit_field`].
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V, acc: V::Output) -> FilterResult<V::Output> {
        visitor.visit_field(self, acc)
    }
}

impl Value {
    /// Dispatch to [`ExpressionVisitor::visit_value`].
    pub fn accept<V: ExpressionVisitor>(&self, visitor: &mut V, acc: V::Output) -> FilterResult<V::Output> {
        visitor.visit_value(self, acc)
    }
}

/// Prints a tree in neutral infix form, e.g. `((a equals x) or (b gt 1))`.
///
/// Operator keys are printed as they appear in the filter map and values are
/// printed unquoted, so the output is meant for logs, not for a database.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfixVisitor;

impl ExpressionVisitor for InfixVisitor {
    type Output = String;

    fn seed(&self) -> String {
        String::new()
    }

    fn visit_compound(&mut self, node: &CompoundExpression, mut acc: String) -> FilterResult<String> {
        let left = node.left.accept(self, String::new())?;
        let right = node.right.accept(self, String::new())?;
        acc.push_str(&format!("({} {} {})", left, node.operator, right));
        Ok(acc)
    }

    fn visit_binary(&mut self, node: &BinaryExpression, mut acc: String) -> FilterResult<String> {
        let field = node.field.accept(self, String::new())?;
        let value = node.value.accept(self, String::new())?;
        acc.push_str(&format!("({} {} {})", field, node.operator, value));
        Ok(acc)
    }

    fn visit_unary(&mut self, node: &UnaryExpression, mut acc: String) -> FilterResult<String> {
        let operand = node.operand.accept(self, String::new())?;
        acc.push_str(&format!("({} {})", node.operator, operand));
        Ok(acc)
    }

    fn visit_field(&mut self, node: &Field, mut acc: String) -> FilterResult<String> {
        acc.push_str(node.name());
        Ok(acc)
    }

    fn visit_value(&mut self, node: &Value, mut acc: String) -> FilterResult<String> {
        acc.push_str(&node.infix());
        Ok(acc)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let infix = InfixVisitor.render(self).map_err(|_| fmt::Error)?;
        f.write_str(&infix)
    }
}
