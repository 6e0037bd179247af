//! Logging setup for Sieve.
//!
//! The crate logs through `tracing`. Nothing is printed unless a subscriber is
//! installed, either by the application or by [`init`] (feature
//! `tracing-subscriber`).
//!
//! # Environment Variables
//!
//! - `SIEVE_DEBUG=true|1|yes` - Enable debug logging
//! - `SIEVE_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `SIEVE_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! ```rust,no_run
//! use sieve_filter::logging;
//!
//! // Call once at startup
//! logging::init();
//! ```
//!
//! Parsing logs each level at `trace` and the finished tree at `debug`.
//! Rendering logs the produced SQL through [`sieve_debug!`](crate::sieve_debug),
//! which is silent unless `SIEVE_DEBUG` is set.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_ENV: &str = "SIEVE_DEBUG";
const LEVEL_ENV: &str = "SIEVE_LOG_LEVEL";
const FORMAT_ENV: &str = "SIEVE_LOG_FORMAT";

/// Check if debug logging is enabled via `SIEVE_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_ENV)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the log level from `SIEVE_LOG_LEVEL`.
///
/// Falls back to "debug" if `SIEVE_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var(LEVEL_ENV) {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Get the output format from `SIEVE_LOG_FORMAT`. Defaults to "json".
pub fn get_log_format() -> &'static str {
    env::var(FORMAT_ENV)
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Install the Sieve subscriber. Subsequent calls are no-ops.
///
/// Does nothing unless `SIEVE_DEBUG` or `SIEVE_LOG_LEVEL` is set.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_ENV).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!("sieve={},sieve_filter={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            match get_log_format() {
                "json" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().json())
                        .init();
                }
                "compact" => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().compact())
                        .init();
                }
                _ => {
                    tracing_subscriber::registry()
                        .with(filter)
                        .with(fmt::layer().pretty())
                        .init();
                }
            }

            tracing::info!(level = level, format = get_log_format(), "Sieve logging initialized");
        }
    });
}

/// Initialize logging at a specific level.
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call it before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var(LEVEL_ENV, level);
    }
    init();
}

/// Initialize debug logging. Same as `SIEVE_DEBUG=true` plus [`init`].
///
/// # Safety
///
/// This function modifies environment variables, which is unsafe in
/// multi-threaded programs. Call it before spawning threads.
pub fn init_debug() {
    // SAFETY: Only called at program startup before threads are spawned.
    unsafe {
        env::set_var(DEBUG_ENV, "true");
    }
    init();
}

/// Debug log that only fires when `SIEVE_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! sieve_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Trace log that only fires when `SIEVE_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! sieve_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}
