//! Fuzz target for the filter parser and SQL renderer.
//!
//! Arbitrary bytes are read as a JSON filter document, parsed and rendered.
//! Both steps should only ever return errors, never panic.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_filter_parser
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sieve_filter::{FilterArgument, FilterParser, SqlRenderer};

/// A filter document built from structured input.
#[derive(Debug, Arbitrary)]
enum FuzzFilter {
    Compound(bool, Vec<FuzzFilter>),
    Not(Box<FuzzFilter>),
    Compare(String, u8, FuzzValue),
    Raw(String),
}

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

const OPERATORS: &[&str] = &[
    "equals", "contains", "starts", "ends", "eq", "gt", "gte", "lt", "lte", "in", "between",
    "and", "not", "unknown",
];

impl FuzzFilter {
    fn to_json(&self) -> serde_json::Value {
        use serde_json::{Value, json};

        match self {
            Self::Compound(and, children) => {
                let key = if *and { "and" } else { "or" };
                json!({ key: children.iter().map(Self::to_json).collect::<Vec<_>>() })
            }
            Self::Not(inner) => json!({ "not": inner.to_json() }),
            Self::Compare(field, op, value) => {
                let op = OPERATORS[*op as usize % OPERATORS.len()];
                let value = match value {
                    FuzzValue::Int(v) => json!(v),
                    FuzzValue::Float(v) => json!(v),
                    FuzzValue::Bool(v) => json!(v),
                    FuzzValue::Text(v) => json!(v),
                    FuzzValue::List(v) => json!(v),
                };
                json!({ field.as_str(): { op: value } })
            }
            Self::Raw(text) => serde_json::from_str(text).unwrap_or(Value::Null),
        }
    }
}

fuzz_target!(|input: (Vec<u8>, FuzzFilter)| {
    let (bytes, structured) = input;
    let parser = FilterParser::new();
    let renderer = SqlRenderer::new();

    if let Ok(text) = std::str::from_utf8(&bytes) {
        if let Ok(filter) = FilterArgument::map_from_json(text) {
            if let Ok(tree) = parser.parse(&filter) {
                let _ = renderer.render_optional(tree.as_ref());
            }
        }
    }

    if let Ok(filter) = FilterArgument::map_from_json(&structured.to_json().to_string()) {
        if let Ok(tree) = parser.parse(&filter) {
            let _ = renderer.render_optional(tree.as_ref());
        }
    }
});
