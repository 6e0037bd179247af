//! Tests that change process environment variables.
//!
//! They live in their own test binary so no other test reads the environment
//! while it is being changed. Tests here serialize on [`ENV_LOCK`].

use std::env;
use std::sync::Mutex;

use pretty_assertions::assert_eq;
use sieve::SieveConfig;
use sieve::filter::logging;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const LOG_VARS: [&str; 3] = ["SIEVE_DEBUG", "SIEVE_LOG_LEVEL", "SIEVE_LOG_FORMAT"];

#[test]
fn test_log_settings() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    // SAFETY: every test in this binary holds ENV_LOCK while touching the environment.
    unsafe {
        for var in LOG_VARS {
            env::remove_var(var);
        }
    }
    assert!(!logging::is_debug_enabled());
    assert_eq!(logging::get_log_level(), "warn");
    assert_eq!(logging::get_log_format(), "json");

    unsafe {
        env::set_var("SIEVE_DEBUG", "YES");
        env::set_var("SIEVE_LOG_LEVEL", "verbose");
        env::set_var("SIEVE_LOG_FORMAT", "Compact");
    }
    assert!(logging::is_debug_enabled());
    assert_eq!(logging::get_log_level(), "debug");
    assert_eq!(logging::get_log_format(), "compact");

    unsafe {
        env::set_var("SIEVE_LOG_LEVEL", "trace");
    }
    assert_eq!(logging::get_log_level(), "trace");

    unsafe {
        for var in LOG_VARS {
            env::remove_var(var);
        }
    }
}

#[test]
fn test_config_env_var_expansion() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    // SAFETY: every test in this binary holds ENV_LOCK while touching the environment.
    unsafe {
        env::set_var("SIEVE_TEST_COLUMN", "emp_first_name");
    }
    let config = SieveConfig::from_str("[render.field_map]\nfirstName = \"${SIEVE_TEST_COLUMN}\"").unwrap();
    assert_eq!(config.render.field_map["firstName"], "emp_first_name");

    unsafe {
        env::remove_var("SIEVE_TEST_COLUMN");
    }
}
