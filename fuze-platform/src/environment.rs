//! Process environment mutation shared by the providers.

use std::env;

use fuze_core::error::{FuzeError, Result};
use tracing::debug;

/// Reject assignments the OS cannot represent.
pub fn validate_assignment(key: &str, value: &str) -> Result<()> {
    if key.is_empty() || key.contains('=') || key.contains('\0') {
        return Err(FuzeError::Config(format!(
            "invalid environment variable name '{}'",
            key
        )));
    }
    if value.contains('\0') {
        return Err(FuzeError::Config(format!(
            "environment variable '{}' has a NUL byte in its value",
            key
        )));
    }
    Ok(())
}

/// Set `key=value` on the current process. `std::env::set_var` goes through
/// the wide-character API on Windows, so non-ASCII values survive.
pub fn apply(key: &str, value: &str) -> Result<()> {
    validate_assignment(key, value)?;
    debug!(key, value, "set environment variable");
    env::set_var(key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_names_are_rejected() {
        assert!(validate_assignment("", "x").is_err());
        assert!(validate_assignment("A=B", "x").is_err());
        assert!(validate_assignment("A", "x\0y").is_err());
        assert!(validate_assignment("UV_CACHE_DIR", "").is_ok());
    }

    #[test]
    fn test_apply_handles_non_ascii() {
        apply("FUZE_TEST_ENV_UNICODE", "héllo wörld ✓").unwrap();
        assert_eq!(env::var("FUZE_TEST_ENV_UNICODE").unwrap(), "héllo wörld ✓");
    }
}
