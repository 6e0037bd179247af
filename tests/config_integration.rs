//! Integration tests for `sieve.toml` configuration.

use std::io::Write;

use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use sieve::prelude::*;

const CONFIG: &str = r#"
    [parser]
    local_offset = "+05:30"

    [render]
    where_prefix = false
    metadata_prefix = "audit."

    [render.field_map]
    firstName = "emp_first_name"

    [render.operator_symbols]
    equals = "=="
"#;

#[test]
fn test_config_drives_parser_and_renderer() {
    let config = SieveConfig::from_str(CONFIG).unwrap();
    let parser = FilterParser::from_config(&config).unwrap();
    let renderer = SqlRenderer::from_config(&config);

    let filter = FilterArgument::map_from_json(
        r#"{"and": [{"firstName": {"equals": "Saurabh"}}, {"age": {"lt": 40}}]}"#,
    )
    .unwrap();
    let tree = parser.parse(&filter).unwrap();
    let rendered = renderer.render_optional(tree.as_ref()).unwrap();

    assert_snapshot!(rendered.sql, @"((emp_first_name == 'Saurabh') AND (age < 40))");
    assert_eq!(rendered.metadata["audit.firstName"], vec!["Saurabh"]);
}

#[test]
fn test_config_local_offset_applies_to_dates() {
    let config = SieveConfig::from_str(CONFIG).unwrap();
    let parser = FilterParser::from_config(&config).unwrap();

    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let filter = filter_map! { "joined" => filter_map! { "gte" => date } };
    let tree = parser.parse(&filter).unwrap();
    let rendered = SqlRenderer::new().render_optional(tree.as_ref()).unwrap();

    assert_snapshot!(rendered.sql, @"WHERE (joined >= '2023-12-31T18:30:00Z')");
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let config = SieveConfig::from_file(file.path()).unwrap();
    assert_eq!(config.render.field_map["firstName"], "emp_first_name");
    assert!(!config.render.where_prefix);
}

#[test]
fn test_config_errors() {
    let err = SieveConfig::from_str("[render]\nunknown_key = 1").unwrap_err();
    assert!(matches!(err, FilterError::Toml { .. }));

    let err = SieveConfig::from_str("[parser]\nlocal_offset = \"+99:99\"").unwrap_err();
    assert!(matches!(err, FilterError::InvalidConfig { .. }));
}
