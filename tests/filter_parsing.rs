//! Integration tests for building expression trees from filter arguments.

use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use sieve::filter::{BinaryExpression, Expression, InfixVisitor, OperatorKind};
use sieve::prelude::*;

fn parse(json: &str) -> FilterResult<Option<Expression>> {
    FilterParser::new().parse(&FilterArgument::map_from_json(json)?)
}

#[test]
fn test_tree_shape() {
    let tree = parse(
        r#"{"or": [{"firstName": {"contains": "Saurabh"}}, {"and": [{"lastName": {"equals": "Jaiswal"}}, {"age": {"gte": 25}}]}]}"#,
    )
    .unwrap()
    .unwrap();

    let Expression::Compound(root) = &tree else {
        panic!("expected a compound root");
    };
    assert!(root.operator.is(names::OR));
    assert_eq!(root.operator.kind(), OperatorKind::Compound);
    assert!(matches!(*root.left, Expression::Binary(BinaryExpression { ref field, .. }) if field.name() == "firstName"));
    assert!(matches!(*root.right, Expression::Compound(_)));
    assert_eq!(tree.depth(), 3);
}

#[test]
fn test_infix_rendering() {
    let tree = parse(r#"{"not": {"or": [{"a": {"in": ["x", "y"]}}, {"b": {"between": [1, 2]}}]}}"#)
        .unwrap()
        .unwrap();
    assert_snapshot!(InfixVisitor.render(&tree).unwrap(), @"(not ((a in x,y) or (b between 1,2)))");
}

#[test]
fn test_order_of_children_is_kept() {
    let tree = parse(r#"{"and": [{"z": {"eq": 1}}, {"a": {"eq": 2}}, {"m": {"eq": 3}}]}"#)
        .unwrap()
        .unwrap();
    assert_snapshot!(tree.to_string(), @"(((z eq 1) and (a eq 2)) and (m eq 3))");
}

#[test]
fn test_no_filter_cases() {
    assert!(parse("{}").unwrap().is_none());
    assert!(parse(r#"{"a": {"eq": 1}, "b": {"eq": 2}}"#).unwrap().is_none());
    assert!(parse(r#"{"or": [{}, {}]}"#).unwrap().is_none());
    assert!(parse(r#"{"not": {}}"#).unwrap().is_none());
}

#[test]
fn test_parse_errors() {
    let err = parse(r#"{"a": {"matches": "x"}}"#).unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.to_string(), "unknown operator `matches` on field `a`");

    let err = parse(r#"{"gt": 1}"#).unwrap_err();
    assert!(matches!(err, FilterError::MissingField { .. }));

    let err = parse(r#"{"a": {"eq": null}}"#).unwrap_err();
    assert!(matches!(err, FilterError::UnsupportedValue { .. }));

    let err = parse("not json").unwrap_err();
    assert!(matches!(err, FilterError::Json { .. }));
}

#[test]
fn test_trees_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Expression>();
    assert_send_sync::<FilterParser>();
}
