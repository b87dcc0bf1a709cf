//! Custom assertions for testing

// These assertions panic on failure by design.
#![allow(clippy::missing_panics_doc)]

/// Assert that an error contains a specific substring
///
/// # Examples
///
/// ```
/// let result: Result<(), String> = Err("Encryption key unavailable".to_string());
/// trustgate_common::assert_error_contains!(result, "unavailable");
/// ```
#[macro_export]
macro_rules! assert_error_contains {
    ($result:expr, $substring:expr) => {
        match &$result {
            Ok(_) => panic!("Expected error but got Ok"),
            Err(e) => {
                let error_msg = format!("{}", e);
                assert!(
                    error_msg.contains($substring),
                    "Error message '{}' does not contain '{}'",
                    error_msg,
                    $substring
                );
            }
        }
    };
}

/// Assert that a `ValidationResult` was rejected with an error containing a
/// substring
///
/// # Examples
///
/// ```
/// use trustgate_common::validation::Sanitizer;
///
/// let result = Sanitizer::default().sanitize_url("javascript:alert(1)");
/// trustgate_common::assert_rejected!(result, "JavaScript");
/// ```
#[macro_export]
macro_rules! assert_rejected {
    ($result:expr, $substring:expr) => {{
        let result = &$result;
        assert!(!result.valid, "Expected rejection but result was valid");
        assert!(
            result.errors.iter().any(|e| e.contains($substring)),
            "No error in {:?} contains '{}'",
            result.errors,
            $substring
        );
    }};
}

/// Assert that a `ValidationResult` was accepted, optionally checking the
/// sanitized value
#[macro_export]
macro_rules! assert_accepted {
    ($result:expr) => {{
        let result = &$result;
        assert!(result.valid, "Expected acceptance but got errors {:?}", result.errors);
    }};
    ($result:expr, $sanitized:expr) => {{
        let result = &$result;
        assert!(result.valid, "Expected acceptance but got errors {:?}", result.errors);
        assert_eq!(result.sanitized.as_deref(), Some($sanitized));
    }};
}
