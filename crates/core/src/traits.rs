//! Core traits for Shapegen
//!
//! Input handed over by the introspection front end is checked once at the
//! boundary. Anything that implements [`Validatable`] can be rejected with a
//! hard failure before any generator sees it.

use crate::error::ShapeResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use shapegen_core::{ShapeError, ShapeResult, Validatable};
///
/// struct Batch {
///     names: Vec<String>,
/// }
///
/// impl Validatable for Batch {
///     fn validate(&self) -> ShapeResult<()> {
///         if self.names.iter().any(|n| n.is_empty()) {
///             return Err(ShapeError::validation("Declaration names cannot be empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `ShapeError` describing the problem.
    fn validate(&self) -> ShapeResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShapeError;

    struct Names(Vec<&'static str>);

    impl Validatable for Names {
        fn validate(&self) -> ShapeResult<()> {
            if self.0.iter().any(|n| n.is_empty()) {
                return Err(ShapeError::validation("empty name"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_is_valid() {
        assert!(Names(vec!["Order"]).is_valid());
        assert!(!Names(vec!["Order", ""]).is_valid());
    }

    #[test]
    fn test_validation_errors() {
        assert!(Names(vec!["Order"]).validation_errors().is_empty());
        assert_eq!(
            Names(vec![""]).validation_errors(),
            vec!["Validation error: empty name".to_string()]
        );
    }
}
