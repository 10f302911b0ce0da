//! Environment variable parsing utilities.
//!
//! Replaces the usual boilerplate:
//!
//! ```ignore
//! std::env::var("VAR_NAME")
//!     .ok()
//!     .and_then(|v| v.parse::<u64>().ok())
//!     .unwrap_or(default_value)
//! ```
//!
//! A value that is set but fails to parse is logged at `warn` and treated as
//! unset.
//!
//! # Example
//!
//! ```
//! use sui_ptb_types::env_utils::{env_bool, env_var, env_var_or};
//!
//! let budget: u64 = env_var_or("SUI_PTB_EXAMPLE_BUDGET", 50_000_000);
//! let custom: Option<u64> = env_var("SUI_PTB_EXAMPLE_CUSTOM");
//! let dry_run = env_bool("SUI_PTB_EXAMPLE_DRY_RUN");
//! # let _ = (budget, custom, dry_run);
//! ```

use std::str::FromStr;

use tracing::warn;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment variable");
            None
        }
    }
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Check if an environment variable is set to a truthy value.
///
/// Returns `true` if the variable is set to "1", "true", "yes", or "on" (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_parsing() {
        std::env::set_var("SUI_PTB_TEST_U64", "42");
        let val: Option<u64> = env_var("SUI_PTB_TEST_U64");
        assert_eq!(val, Some(42));

        std::env::set_var("SUI_PTB_TEST_BAD_U64", "forty-two");
        let bad: Option<u64> = env_var("SUI_PTB_TEST_BAD_U64");
        assert_eq!(bad, None);

        let missing: Option<u64> = env_var("SUI_PTB_NONEXISTENT_12345");
        assert_eq!(missing, None);

        std::env::remove_var("SUI_PTB_TEST_U64");
        std::env::remove_var("SUI_PTB_TEST_BAD_U64");
    }

    #[test]
    fn test_env_var_or() {
        std::env::set_var("SUI_PTB_TEST_DEFAULT", "100");
        let val: u64 = env_var_or("SUI_PTB_TEST_DEFAULT", 50);
        assert_eq!(val, 100);

        let default_val: u64 = env_var_or("SUI_PTB_NONEXISTENT_12346", 50);
        assert_eq!(default_val, 50);

        std::env::remove_var("SUI_PTB_TEST_DEFAULT");
    }

    #[test]
    fn test_env_bool() {
        std::env::set_var("SUI_PTB_TEST_BOOL_TRUE", "true");
        std::env::set_var("SUI_PTB_TEST_BOOL_YES", "YES");
        std::env::set_var("SUI_PTB_TEST_BOOL_FALSE", "false");

        assert!(env_bool("SUI_PTB_TEST_BOOL_TRUE"));
        assert!(env_bool("SUI_PTB_TEST_BOOL_YES"));
        assert!(!env_bool("SUI_PTB_TEST_BOOL_FALSE"));
        assert!(!env_bool("SUI_PTB_NONEXISTENT_12347"));

        std::env::remove_var("SUI_PTB_TEST_BOOL_TRUE");
        std::env::remove_var("SUI_PTB_TEST_BOOL_YES");
        std::env::remove_var("SUI_PTB_TEST_BOOL_FALSE");
    }
}
