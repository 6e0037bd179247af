//! # sieve-filter
//!
//! Turns nested filter arguments into an expression tree and renders the tree
//! as a SQL `WHERE` clause.
//!
//! This crate provides:
//! - An operator registry with the 13 default operators
//! - A parser from filter maps (`{"or": [{"age": {"gt": 30}}, ...]}`) to [`Expression`] trees
//! - A visitor protocol for walking trees
//! - A SQL renderer with string escaping, field renaming and custom expressions
//!
//! ## Parsing
//!
//! ```rust
//! use sieve_filter::{FilterArgument, FilterParser};
//!
//! let filter = FilterArgument::map_from_json(
//!     r#"{"and": [{"firstName": {"equals": "Saurabh"}}, {"not": {"age": {"lt": 18}}}]}"#,
//! ).unwrap();
//!
//! let tree = FilterParser::new().parse(&filter).unwrap().unwrap();
//! assert_eq!(tree.to_string(), "((firstName equals Saurabh) and (not (age lt 18)))");
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use sieve_filter::{filter_map, FilterParser, SqlRenderer};
//!
//! let filter = filter_map! {
//!     "lastName" => filter_map! { "in" => vec!["Jaiswal", "Gupta", "Kumar"] },
//! };
//! let tree = FilterParser::new().parse(&filter).unwrap().unwrap();
//!
//! let rendered = SqlRenderer::new().render(&tree).unwrap();
//! assert_eq!(rendered.sql, "WHERE (lastName IN ('Jaiswal', 'Gupta', 'Kumar'))");
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use sieve_filter::{FilterArgument, FilterError, FilterParser};
//!
//! let filter = FilterArgument::map_from_json(r#"{"name": {"like": "x"}}"#).unwrap();
//! let err = FilterParser::new().parse(&filter).unwrap_err();
//! assert!(matches!(err, FilterError::UnknownOperator { .. }));
//! ```

pub mod argument;
pub mod ast;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod operator;
pub mod parser;
pub mod sql;
pub mod visitor;

pub use argument::{FilterArgument, FilterMap};
pub use ast::{
    BinaryExpression, CompoundExpression, Expression, Field, Scalar, UnaryExpression, Value,
};
pub use config::SieveConfig;
pub use error::{FilterError, FilterResult};
pub use operator::{Operator, OperatorKind, OperatorRegistry, ValueCategory};
pub use parser::FilterParser;
pub use sql::{RenderedFilter, SqlRenderer};
pub use visitor::{ExpressionVisitor, InfixVisitor};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::argument::{FilterArgument, FilterMap};
    pub use crate::ast::{Expression, Scalar, Value};
    pub use crate::config::SieveConfig;
    pub use crate::error::{FilterError, FilterResult};
    pub use crate::filter_map;
    pub use crate::operator::{Operator, OperatorRegistry, names};
    pub use crate::parser::FilterParser;
    pub use crate::sql::{
        CustomExpressionResolver, CustomExpressions, CustomFieldExpression, FieldValueTransformer,
        LogicalOperator, RenderedFilter, SqlRenderer,
    };
    pub use crate::visitor::ExpressionVisitor;
}
