//! # Sieve
//!
//! Translate nested filter arguments, as they arrive from a GraphQL or JSON
//! API, into SQL `WHERE` clauses.
//!
//! Sieve provides:
//! - A parser from filter maps to expression trees
//! - A SQL renderer with safe string escaping
//! - Field renaming, value transformation and custom per-field expressions
//! - Optional `sieve.toml` configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use sieve::prelude::*;
//!
//! let filter = FilterArgument::map_from_json(
//!     r#"{"or": [{"firstName": {"contains": "Saurabh"}}, {"age": {"between": [32, 40]}}]}"#,
//! )?;
//!
//! let tree = FilterParser::new().parse(&filter)?;
//! let rendered = SqlRenderer::new()
//!     .rename_field("firstName", "first_name")
//!     .render_optional(tree.as_ref())?;
//!
//! assert_eq!(
//!     rendered.sql,
//!     "WHERE ((first_name LIKE '%Saurabh%') OR (age BETWEEN 32 AND 40))"
//! );
//! # Ok::<(), sieve::FilterError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Filter parsing, expression trees and SQL rendering.
pub mod filter {
    pub use sieve_filter::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sieve_filter::prelude::*;
}

// Re-export key types at the crate root
pub use sieve_filter::{
    Expression, FilterArgument, FilterError, FilterMap, FilterParser, FilterResult,
    RenderedFilter, SieveConfig, SqlRenderer, filter_map,
};
