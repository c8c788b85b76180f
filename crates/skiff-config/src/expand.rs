//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a string.
///
/// A reference to an unset variable without a default is an error naming
/// both the variable and the config field. Strings without `${` are returned
/// unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Variable lookup failure.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SKIFF_TEST_EXPAND_SET", "site");
        }
        let result = expand_env("${SKIFF_TEST_EXPAND_SET}", "output.dir").unwrap();
        assert_eq!(result, "site");
        unsafe {
            std::env::remove_var("SKIFF_TEST_EXPAND_SET");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SKIFF_TEST_EXPAND_UNSET");
        }
        let result = expand_env("${SKIFF_TEST_EXPAND_UNSET:-public}", "output.dir").unwrap();
        assert_eq!(result, "public");
    }

    #[test]
    fn test_expand_value_wins_over_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SKIFF_TEST_EXPAND_BOTH", "dist");
        }
        let result = expand_env("${SKIFF_TEST_EXPAND_BOTH:-public}", "output.dir").unwrap();
        assert_eq!(result, "dist");
        unsafe {
            std::env::remove_var("SKIFF_TEST_EXPAND_BOTH");
        }
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SKIFF_TEST_EXPAND_ROOT", "/srv/blog");
        }
        let result = expand_env("${SKIFF_TEST_EXPAND_ROOT}/posts", "output.dir").unwrap();
        assert_eq!(result, "/srv/blog/posts");
        unsafe {
            std::env::remove_var("SKIFF_TEST_EXPAND_ROOT");
        }
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SKIFF_TEST_EXPAND_MISSING");
        }
        let err = expand_env("${SKIFF_TEST_EXPAND_MISSING}", "output.dir").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("SKIFF_TEST_EXPAND_MISSING"));
        assert!(err.to_string().contains("output.dir"));
    }

    #[test]
    fn test_literal_unchanged() {
        let result = expand_env("html", "output.extension").unwrap();
        assert_eq!(result, "html");
    }
}
