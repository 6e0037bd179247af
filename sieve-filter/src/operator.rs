//! Operators and the operator registry.
//!
//! The registry is the single source of truth for which keys of a filter map
//! are operators and which are field names. It is built once, wrapped in an
//! `Arc`, and handed to the parser; lookups never mutate it.
//!
//! ```rust
//! use sieve_filter::operator::{names, OperatorKind, OperatorRegistry};
//!
//! let registry = OperatorRegistry::with_defaults();
//! assert_eq!(registry.len(), 13);
//! assert!(registry.contains(names::BETWEEN));
//! assert_eq!(registry.get(names::AND).map(|op| op.kind()), Some(OperatorKind::Compound));
//! assert!(registry.get("firstName").is_none());
//! ```

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::error::{FilterError, FilterResult};

/// Keys of the default operators.
pub mod names {
    /// Logical conjunction.
    pub const AND: &str = "and";
    /// Logical disjunction.
    pub const OR: &str = "or";
    /// Logical negation.
    pub const NOT: &str = "not";
    /// String equality.
    pub const EQUALS: &str = "equals";
    /// Substring match.
    pub const CONTAINS: &str = "contains";
    /// Prefix match.
    pub const STARTS: &str = "starts";
    /// Suffix match.
    pub const ENDS: &str = "ends";
    /// Numeric equality.
    pub const EQ: &str = "eq";
    /// Greater than.
    pub const GT: &str = "gt";
    /// Greater than or equal.
    pub const GTE: &str = "gte";
    /// Less than.
    pub const LT: &str = "lt";
    /// Less than or equal.
    pub const LTE: &str = "lte";
    /// Membership in a list.
    pub const IN: &str = "in";
    /// Inclusive range.
    pub const BETWEEN: &str = "between";
}

/// Arity class of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    /// Combines two or more sub-filters (`and`, `or`).
    Compound,
    /// Compares a field against a value (`equals`, `gt`, ...).
    Binary,
    /// Wraps a single sub-filter (`not`).
    Unary,
}

impl OperatorKind {
    /// Lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compound => "compound",
            Self::Binary => "binary",
            Self::Unary => "unary",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of values an operator applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    /// Sub-filters.
    Logical,
    /// Text.
    String,
    /// Integers and floats.
    Numeric,
    /// Dates and instants.
    DateTime,
}

/// A named filter operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator {
    name: SmolStr,
    kind: OperatorKind,
    categories: SmallVec<[ValueCategory; 2]>,
}

impl Operator {
    /// Create a new operator.
    pub fn new(
        name: impl Into<SmolStr>,
        kind: OperatorKind,
        categories: impl IntoIterator<Item = ValueCategory>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            categories: categories.into_iter().collect(),
        }
    }

    /// Create a compound operator over sub-filters.
    pub fn compound(name: impl Into<SmolStr>) -> Self {
        Self::new(name, OperatorKind::Compound, [ValueCategory::Logical])
    }

    /// Create a unary operator over a sub-filter.
    pub fn unary(name: impl Into<SmolStr>) -> Self {
        Self::new(name, OperatorKind::Unary, [ValueCategory::Logical])
    }

    /// Create a binary comparison operator.
    pub fn binary(
        name: impl Into<SmolStr>,
        categories: impl IntoIterator<Item = ValueCategory>,
    ) -> Self {
        Self::new(name, OperatorKind::Binary, categories)
    }

    /// The registry key of this operator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The arity class.
    pub fn kind(&self) -> OperatorKind {
        self.kind
    }

    /// Value categories this operator applies to.
    pub fn categories(&self) -> &[ValueCategory] {
        &self.categories
    }

    /// Check whether the operator applies to a value category.
    pub fn applies_to(&self, category: ValueCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Check whether the operator has the given key.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Catalog of known operators keyed by name.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    operators: IndexMap<SmolStr, Operator>,
}

impl OperatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the 13 default operators.
    pub fn with_defaults() -> Self {
        use ValueCategory::{DateTime, Numeric, String};

        let mut registry = Self::new();

        // Logical
        registry.register(Operator::compound(names::AND));
        registry.register(Operator::compound(names::OR));
        registry.register(Operator::unary(names::NOT));

        // String
        registry.register(Operator::binary(names::EQUALS, [String]));
        registry.register(Operator::binary(names::CONTAINS, [String]));
        registry.register(Operator::binary(names::STARTS, [String]));
        registry.register(Operator::binary(names::ENDS, [String]));

        // Numeric
        registry.register(Operator::binary(names::EQ, [Numeric]));
        registry.register(Operator::binary(names::GT, [Numeric]));
        registry.register(Operator::binary(names::GTE, [Numeric]));
        registry.register(Operator::binary(names::LT, [Numeric]));
        registry.register(Operator::binary(names::LTE, [Numeric]));

        // Range
        registry.register(Operator::binary(names::IN, [String, Numeric]));
        registry.register(Operator::binary(names::BETWEEN, [DateTime, Numeric]));

        registry
    }

    /// Insert an operator, replacing and returning any operator with the same key.
    pub fn register(&mut self, operator: Operator) -> Option<Operator> {
        self.operators.insert(operator.name.clone(), operator)
    }

    /// Non-failing probe for an operator.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.operators.get(name)
    }

    /// Look up an operator, failing if it is not registered.
    pub fn lookup(&self, name: &str) -> FilterResult<&Operator> {
        self.get(name).ok_or_else(|| FilterError::UnknownOperator {
            operator: name.to_string(),
            field: None,
        })
    }

    /// Check whether a key names a registered operator.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Number of registered operators.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Check if no operators are registered.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Iterate over operators in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Operator> {
        self.operators.values()
    }
}
